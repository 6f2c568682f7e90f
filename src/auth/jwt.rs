use std::{sync::Arc, time::Duration};

use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};
use tracing::debug;

use super::{
    claims::{Claims, Identity},
    error::AuthError,
    jwks::{HttpKeySetSource, KeyCache},
};
use crate::config::AuthConfig;

/// The only signature algorithm the issuer's tokens may use.
const ALGORITHM: Algorithm = Algorithm::ES256;

/// Verifies bearer tokens against the issuer's published signing keys.
pub struct TokenVerifier {
    keys: KeyCache,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: KeyCache, audience: &str) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        validation.leeway = 0;
        Self { keys, validation }
    }

    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        let source = HttpKeySetSource::new(
            config.jwks_url(),
            Duration::from_secs(config.jwks_timeout_secs),
        )?;
        let keys = KeyCache::new(
            Arc::new(source),
            config.jwks_requests_per_minute,
            Duration::from_secs(config.jwks_cache_ttl_secs),
        );
        Ok(Self::new(keys, &config.audience))
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(AuthError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::DisallowedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.keys.key_for(&kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e),
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Resolves an `Authorization` header value to the caller's identity.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let header = authorization.ok_or(AuthError::MissingHeader)?;
        let token = bearer_token(header)?;
        self.verify(token).await.map(Identity::from)
    }
}

fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidScheme)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidScheme);
    }
    Ok(token)
}
