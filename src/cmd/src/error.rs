use std::net::AddrParseError;
use std::result;

use metadata::error::MetadataError;
use platform::PlatformError;
use storage::error::StoreError;
use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Internal: {0}")]
    Internal(String),
    #[error("BadRequest: {0}")]
    BadRequest(String),
    #[error("IP Address Parse Error: {0:?}")]
    AddrParseError(#[from] AddrParseError),
    #[error("StdIO: {0:?}")]
    StdIO(#[from] std::io::Error),
    #[error("TimeDurationOutOfRange: {0:?}")]
    TimeDurationOutOfRange(#[from] chrono::OutOfRangeError),
    #[error("ParseDuration: {0:?}")]
    ParseDuration(#[from] parse_duration::parse::Error),
    #[error("Config: {0:?}")]
    Config(#[from] config::ConfigError),
    #[error("SetGlobalDefaultError: {0:?}")]
    SetGlobalDefaultError(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("Prometheus: {0:?}")]
    Prometheus(#[from] metrics_exporter_prometheus::BuildError),
    #[error("Metadata: {0:?}")]
    Metadata(#[from] MetadataError),
    #[error("Store: {0:?}")]
    Store(#[from] StoreError),
    #[error("Platform: {0:?}")]
    Platform(#[from] PlatformError),
    #[error("other: {0:?}")]
    Other(#[from] anyhow::Error),
}
