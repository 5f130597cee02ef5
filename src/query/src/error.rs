use std::result;

use metadata::error::MetadataError;
use storage::error::StoreError;
use thiserror::Error;

pub type Result<T> = result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("malformed descriptor {0:?}")]
    MalformedDescriptor(String),
    #[error("unsupported operator {0:?}")]
    UnsupportedOperator(String),
    #[error("metadata {0:?}")]
    Metadata(#[from] MetadataError),
    #[error("store {0:?}")]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Errors caused by the infrastructure rather than by the funnel definition.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Store(_))
    }
}
