use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use crate::error::AuthError;
use crate::PlatformError;
use crate::Result;

/// Request data whose authenticity has already been checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedRequest {
    pub website_id: String,
    /// unix seconds, the lower bound (exclusive) of the analysed period
    pub timestamp: i64,
}

/// Turns a bearer credential into a [VerifiedRequest].
pub trait RequestVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<VerifiedRequest>;
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub exp: i64,
    pub website_id: String,
    pub timestamp: i64,
}

pub fn make_token(
    website_id: impl Into<String>,
    timestamp: i64,
    expires: Duration,
    token_key: impl AsRef<[u8]>,
) -> Result<String> {
    let header = Header {
        alg: Algorithm::HS512,
        ..Default::default()
    };
    let claims = Claims {
        exp: (Utc::now() + expires).timestamp(),
        website_id: website_id.into(),
        timestamp,
    };

    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(token_key.as_ref()),
    )
    .map_err(|err| PlatformError::from(err).wrap_into(AuthError::CantMakeAccessToken))
}

pub fn parse_token(value: &str, token_key: impl AsRef<[u8]>) -> Result<Claims> {
    let token = decode(
        value,
        &DecodingKey::from_secret(token_key.as_ref()),
        &Validation::new(Algorithm::HS512),
    )?;

    Ok(token.claims)
}

/// HS512 signed tokens carrying the website and the anchor timestamp.
pub struct TokenVerifier {
    token_key: String,
}

impl TokenVerifier {
    pub fn new(token_key: impl Into<String>) -> Self {
        Self {
            token_key: token_key.into(),
        }
    }
}

impl RequestVerifier for TokenVerifier {
    fn verify(&self, credential: &str) -> Result<VerifiedRequest> {
        let claims = parse_token(credential, &self.token_key)
            .map_err(|err| err.wrap_into(AuthError::CantParseAccessToken))?;

        Ok(VerifiedRequest {
            website_id: claims.website_id,
            timestamp: claims.timestamp,
        })
    }
}

/// Instant after which records are counted.
pub fn resolve_anchor(req: &VerifiedRequest) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(req.timestamp, 0).ok_or_else(|| {
        PlatformError::BadRequest(format!("timestamp {} is out of range", req.timestamp))
    })
}
