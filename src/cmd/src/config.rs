use std::net::SocketAddr;
use std::path::PathBuf;

use clap::ValueEnum;
use serde_derive::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::Level;

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Server {
    pub host: SocketAddr,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Data {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Auth {
    pub token_key: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub timeout: String,
    pub in_chunk_size: usize,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Cache {
    pub ttl: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Throttle {
    pub lock_ttl: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Default)]
pub struct Payments {
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Log {
    pub level: LogLevel,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub server: Server,
    pub data: Data,
    pub auth: Auth,
    pub query: Query,
    pub cache: Cache,
    pub throttle: Throttle,
    #[serde(default)]
    pub payments: Payments,
    pub log: Log,
}

pub fn parse_duration(s: &str) -> crate::error::Result<chrono::Duration> {
    Ok(chrono::Duration::from_std(parse_duration::parse(s)?)?)
}

impl TryInto<common::config::Config> for Config {
    type Error = crate::error::Error;

    fn try_into(self) -> Result<common::config::Config, Self::Error> {
        if self.auth.token_key.is_empty() {
            return Err(crate::error::Error::BadRequest(
                "auth.token_key must not be empty".to_string(),
            ));
        }

        Ok(common::config::Config {
            server: common::config::Server {
                host: self.server.host,
            },
            data: common::config::Data {
                path: self.data.path,
            },
            auth: common::config::Auth {
                token_key: self.auth.token_key,
            },
            query: common::config::Query {
                timeout: parse_duration(self.query.timeout.as_str())?,
                in_chunk_size: self.query.in_chunk_size.max(1),
            },
            cache: common::config::Cache {
                ttl: parse_duration(self.cache.ttl.as_str())?,
            },
            throttle: common::config::Throttle {
                lock_ttl: parse_duration(self.throttle.lock_ttl.as_str())?,
            },
            payments: common::config::Payments {
                source_url: self.payments.source_url.filter(|url| !url.is_empty()),
            },
            log: common::config::Log {
                level: self.log.level.into(),
            },
        })
    }
}

#[derive(Deserialize, Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
        .into()
    }
}
