use std::error;
use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, CommonError>;
pub type GenericError = Box<dyn error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("BadRequest: {0}")]
    BadRequest(String),
    #[error("serde: {0:?}")]
    Serde(#[from] serde_json::Error),
}
