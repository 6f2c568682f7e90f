use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Why a bearer token was refused. Logged server-side; every variant is a
/// plain 401 to the client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("invalid auth scheme: expected Bearer")]
    InvalidScheme,
    #[error("malformed token: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
    #[error("algorithm {0:?} is not accepted")]
    DisallowedAlgorithm(Algorithm),
    #[error("token header has no key id")]
    MissingKeyId,
    #[error("no signing key with id {0}")]
    UnknownKey(String),
    #[error("signing key set fetch failed: {0:#}")]
    KeyFetch(anyhow::Error),
    #[error("signing key set refresh is rate limited")]
    RefreshRateLimited,
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}
