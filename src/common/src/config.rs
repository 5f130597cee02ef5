use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone)]
pub struct Server {
    pub host: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Data {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Auth {
    // HS512 key shared with the request signer
    pub token_key: String,
}

#[derive(Debug, Clone)]
pub struct Query {
    pub timeout: Duration,
    pub in_chunk_size: usize,
}

#[derive(Debug, Clone)]
pub struct Cache {
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Throttle {
    pub lock_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Payments {
    pub source_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Log {
    pub level: LevelFilter,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: Server,
    pub data: Data,
    pub auth: Auth,
    pub query: Query,
    pub cache: Cache,
    pub throttle: Throttle,
    pub payments: Payments,
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: Server {
                host: SocketAddr::from(([0, 0, 0, 0], 8080)),
            },
            data: Data {
                path: Default::default(),
            },
            auth: Auth {
                token_key: Default::default(),
            },
            query: Query {
                timeout: Duration::seconds(30),
                in_chunk_size: crate::types::DEFAULT_IN_CHUNK_SIZE,
            },
            cache: Cache {
                ttl: Duration::minutes(5),
            },
            throttle: Throttle {
                lock_ttl: Duration::hours(1),
            },
            payments: Payments { source_url: None },
            log: Log {
                level: LevelFilter::INFO,
            },
        }
    }
}
