use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use jsonwebtoken::{
    jwk::{AlgorithmParameters, JwkSet},
    DecodingKey,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::AuthError;

/// Somewhere a published signing key set can be fetched from.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<JwkSet>;
}

/// Fetches the issuer's JWKS document over HTTPS.
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySetSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build JWKS http client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> anyhow::Result<JwkSet> {
        let set = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?
            .error_for_status()
            .context("JWKS endpoint returned an error status")?
            .json::<JwkSet>()
            .await
            .context("decode JWKS body")?;
        Ok(set)
    }
}

/// Decoding keys by key id, refreshed from the source on a cache miss or once
/// the set is older than the configured TTL.
///
/// Refreshes go through a rate limiter so a flood of tokens with unknown key
/// ids cannot turn into a flood of requests to the issuer. When an expiry
/// refresh fails, the previous set keeps serving until a refresh succeeds.
pub struct KeyCache {
    source: Arc<dyn KeySetSource>,
    cached: RwLock<CachedKeys>,
    ttl: Duration,
    refresh_limiter: DefaultDirectRateLimiter,
}

#[derive(Default)]
struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl CachedKeys {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.is_some_and(|at| at.elapsed() < ttl)
    }
}

impl KeyCache {
    pub fn new(source: Arc<dyn KeySetSource>, refreshes_per_minute: u32, ttl: Duration) -> Self {
        let per_minute = NonZeroU32::new(refreshes_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            source,
            cached: RwLock::new(CachedKeys::default()),
            ttl,
            refresh_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        }
    }

    pub async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let stale = {
            let cached = self.cached.read().await;
            let key = cached.keys.get(kid).cloned();
            match key {
                Some(key) if cached.is_fresh(self.ttl) => return Ok(key),
                other => other,
            }
        };

        if let Err(e) = self.refresh().await {
            return match stale {
                Some(key) => {
                    warn!(%kid, error = %e, "key set refresh failed; serving cached key");
                    Ok(key)
                }
                None => Err(e),
            };
        }

        self.cached
            .read()
            .await
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        if self.refresh_limiter.check().is_err() {
            return Err(AuthError::RefreshRateLimited);
        }

        let set = self.source.fetch().await.map_err(AuthError::KeyFetch)?;
        let keys = decoding_keys(&set);
        info!(count = keys.len(), "signing key set refreshed");
        *self.cached.write().await = CachedKeys {
            keys,
            fetched_at: Some(Instant::now()),
        };
        Ok(())
    }
}

/// Only elliptic-curve keys are kept: symmetric entries in the published set
/// must never become usable for verification.
fn decoding_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.as_ref()?;
            if !matches!(jwk.algorithm, AlgorithmParameters::EllipticCurve(_)) {
                debug!(%kid, "skipping non elliptic-curve key");
                return None;
            }
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid.clone(), key)),
                Err(e) => {
                    warn!(%kid, error = %e, "unusable signing key");
                    None
                }
            }
        })
        .collect()
}
