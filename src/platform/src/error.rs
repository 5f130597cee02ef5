use std::collections::BTreeMap;
use std::result;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use common::error::CommonError;
use common::http::ApiError;
use metadata::error::MetadataError;
use query::error::QueryError;
use storage::error::StoreError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = result::Result<T, PlatformError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("can't parse bearer header")]
    CantParseBearerHeader,
    #[error("can't parse access token")]
    CantParseAccessToken,
    #[error("can't make access token")]
    CantMakeAccessToken,
}

// message returned for failures whose details stay in the logs
const INTERNAL_MESSAGE: &str = "internal server error";
const UNAVAILABLE_MESSAGE: &str = "service temporarily unavailable, retry later";

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{1:?} error wrapped into {0:?}")]
    Wrapped(Box<PlatformError>, Box<PlatformError>),
    #[error("invalid fields")]
    InvalidFields(BTreeMap<String, String>),
    #[error("bad request: {0:?}")]
    BadRequest(String),
    #[error("forbidden: {0:?}")]
    Forbidden(String),
    #[error("unavailable: {0:?}")]
    Unavailable(String),
    #[error("internal: {0:?}")]
    Internal(String),
    #[error("serde: {0:?}")]
    Serde(#[from] serde_json::Error),
    #[error("jsonwebtoken: {0:?}")]
    JSONWebToken(#[from] jsonwebtoken::errors::Error),
    #[error("metadata: {0:?}")]
    Metadata(#[from] MetadataError),
    #[error("query: {0:?}")]
    Query(#[from] QueryError),
    #[error("store: {0:?}")]
    Store(#[from] StoreError),
    #[error("common: {0:?}")]
    Common(#[from] CommonError),
    #[error("session: {0:?}")]
    Auth(#[from] AuthError),
    #[error("http client: {0:?}")]
    Reqwest(#[from] reqwest::Error),
    #[error("url: {0:?}")]
    Url(#[from] url::ParseError),
}

fn internal(err: impl std::fmt::Debug) -> ApiError {
    error!("internal error: {:?}", err);
    ApiError::internal(INTERNAL_MESSAGE)
}

fn unavailable(err: impl std::fmt::Debug) -> ApiError {
    error!("dependency unavailable: {:?}", err);
    ApiError::unavailable(UNAVAILABLE_MESSAGE)
}

impl PlatformError {
    pub fn wrap_into(self, err: impl Into<PlatformError>) -> PlatformError {
        PlatformError::Wrapped(Box::new(self), Box::new(err.into()))
    }

    pub fn into_api_error(self) -> ApiError {
        match self {
            PlatformError::Serde(err) => ApiError::bad_request(err.to_string()),
            PlatformError::Metadata(err) => match err {
                MetadataError::AlreadyExists(msg) => ApiError::conflict(msg),
                MetadataError::NotFound(msg) => ApiError::not_found(msg),
                MetadataError::BadRequest(msg) => ApiError::bad_request(msg),
                err => internal(err),
            },
            PlatformError::Query(err) => match err {
                QueryError::MalformedDescriptor(msg) => {
                    ApiError::bad_request(format!("malformed step descriptor: {msg}"))
                }
                QueryError::UnsupportedOperator(op) => {
                    ApiError::bad_request(format!("unsupported operator {op:?}"))
                }
                QueryError::Store(err) => unavailable(err),
                QueryError::Metadata(err) => PlatformError::Metadata(err).into_api_error(),
            },
            PlatformError::Store(err) => match err {
                StoreError::InvalidParameter(msg) => ApiError::bad_request(msg),
                err => unavailable(err),
            },
            PlatformError::BadRequest(msg) => ApiError::bad_request(msg),
            PlatformError::Internal(msg) => internal(msg),
            PlatformError::Unavailable(msg) => unavailable(msg),
            PlatformError::Common(err) => match err {
                CommonError::BadRequest(msg) => ApiError::bad_request(msg),
                err => internal(err),
            },
            PlatformError::Auth(err) => match err {
                AuthError::CantParseBearerHeader => ApiError::unauthorized(err),
                AuthError::CantParseAccessToken => ApiError::unauthorized(err),
                AuthError::CantMakeAccessToken => internal(err),
            },
            PlatformError::Forbidden(err) => ApiError::forbidden(err),
            PlatformError::JSONWebToken(err) => internal(err),
            PlatformError::Reqwest(err) => unavailable(err),
            PlatformError::Url(err) => internal(err),
            PlatformError::Wrapped(_, outer) => outer.into_api_error(),
            PlatformError::InvalidFields(fields) => ApiError::new(StatusCode::BAD_REQUEST)
                .with_message("invalid fields".to_string())
                .with_fields(fields),
        }
    }
}

#[derive(Default)]
pub struct ValidationError {
    fields: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, err: impl Into<String>) {
        self.fields.insert(field.into(), err.into());
    }

    pub fn push_invalid(&mut self, field: impl Into<String>) {
        self.fields
            .insert(field.into(), "invalid field value".into());
    }

    pub fn result(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(PlatformError::InvalidFields(self.fields))
        }
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        self.into_api_error().into_response()
    }
}
