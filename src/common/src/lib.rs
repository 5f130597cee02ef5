pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use types::DEFAULT_IN_CHUNK_SIZE;
