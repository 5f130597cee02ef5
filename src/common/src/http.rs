use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::FromRequest;
use axum::extract::MatchedPath;
use axum::extract::Request;
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use metrics::counter;
use metrics::histogram;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::types::METRIC_HTTP_REQUESTS_TOTAL;
use crate::types::METRIC_HTTP_REQUEST_TIME_SECONDS;

/// Error returned to API clients.
///
/// Rendered as `{"ok":false,"error":"<message>"}` with the HTTP status of the error.
/// Only the human readable message leaves the process.
#[derive(Error, Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message.as_deref().unwrap_or_default())
    }
}

#[derive(Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, String>,
}

impl ApiError {
    pub fn bad_request(err: impl ToString) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST).with_message(err.to_string())
    }

    pub fn forbidden(err: impl ToString) -> Self {
        ApiError::new(StatusCode::FORBIDDEN).with_message(err.to_string())
    }

    pub fn unauthorized(err: impl ToString) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED).with_message(err.to_string())
    }

    pub fn conflict(err: impl ToString) -> Self {
        ApiError::new(StatusCode::CONFLICT).with_message(err.to_string())
    }

    pub fn not_found(err: impl ToString) -> Self {
        ApiError::new(StatusCode::NOT_FOUND).with_message(err.to_string())
    }

    pub fn unavailable(err: impl ToString) -> Self {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE).with_message(err.to_string())
    }

    pub fn internal(err: impl ToString) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR).with_message(err.to_string())
    }

    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(status = %self.status, error = ?self.message, "api error");
        let error = match self.message {
            Some(msg) => msg,
            None => self.status.canonical_reason().unwrap_or("error").to_string(),
        };
        let body = ApiErrorBody {
            ok: false,
            error,
            fields: self.fields,
        };
        (self.status, axum::Json(body)).into_response()
    }
}

/// Json body extractor that answers malformed bodies with an [ApiError] instead of axum's
/// plain text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(v)| Json(v))
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
    }
}

impl<T> IntoResponse for Json<T>
where T: Serialize
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Records request latency and count labeled by route template and status.
pub async fn measure_request_response(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    // label by template so ids in the path don't blow up cardinality
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();
    let res = next.run(req).await;
    let status = res.status().as_u16().to_string();

    histogram!(METRIC_HTTP_REQUEST_TIME_SECONDS, "path" => path.clone(), "status" => status.clone())
        .record(start.elapsed().as_secs_f64());
    counter!(METRIC_HTTP_REQUESTS_TOTAL, "path" => path, "status" => status).increment(1);

    res
}
