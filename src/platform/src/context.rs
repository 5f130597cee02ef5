use std::sync::Arc;

use axum::async_trait;
use axum::extract::Extension;
use axum::http::request::Parts;
use axum_core::extract::FromRequestParts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::anchor::RequestVerifier;
use crate::anchor::VerifiedRequest;
use crate::error::AuthError;
use crate::PlatformError;
use crate::Result;

/// Verified caller of an API request.
#[derive(Clone, Debug)]
pub struct Context {
    pub request: VerifiedRequest,
}

impl Context {
    pub fn website_id(&self) -> &str {
        &self.request.website_id
    }

    /// The credential only grants access to the website it was issued for.
    pub fn check_website(&self, website_id: &str) -> Result<()> {
        if self.request.website_id != website_id {
            return Err(PlatformError::Forbidden(
                "credential was issued for another website".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where S: Send + Sync
{
    type Rejection = PlatformError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> core::result::Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_err| AuthError::CantParseBearerHeader)?;

        let Extension(verifier) =
            Extension::<Arc<dyn RequestVerifier>>::from_request_parts(parts, state)
                .await
                .map_err(|err| PlatformError::Internal(err.to_string()))?;

        Ok(Context {
            request: verifier.verify(bearer.token())?,
        })
    }
}
