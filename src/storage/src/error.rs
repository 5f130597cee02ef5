use std::result;

use common::error::CommonError;
use thiserror::Error;

pub type Result<T> = result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("internal {0:?}")]
    Internal(String),
    #[error("invalid parameter {0:?}")]
    InvalidParameter(String),
    #[error("unavailable {0:?}")]
    Unavailable(String),
    #[error("common {0:?}")]
    Common(#[from] CommonError),
    #[error("rocksdb {0:?}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("io {0:?}")]
    Io(#[from] std::io::Error),
    #[error("bincode {0:?}")]
    Bincode(#[from] bincode::Error),
    #[error("join {0:?}")]
    Join(#[from] tokio::task::JoinError),
}
