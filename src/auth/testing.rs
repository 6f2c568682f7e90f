//! Signing fixtures for verifier and router tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use time::OffsetDateTime;

use super::{claims::Claims, jwks::KeySetSource};

pub(crate) const PRIVATE_KEY_PEM: &str = include_str!("../../tests/fixtures/es256_private.pem");
pub(crate) const JWKS_JSON: &str = include_str!("../../tests/fixtures/jwks.json");
pub(crate) const KID: &str = "test-es256";
pub(crate) const LEGACY_KID: &str = "legacy-hs256";
pub(crate) const LEGACY_SECRET: &[u8] = b"legacy-shared-secret";

pub(crate) struct StaticKeySet {
    set: Mutex<Option<JwkSet>>,
    pub fetches: AtomicUsize,
}

impl StaticKeySet {
    pub fn fixture() -> Self {
        Self {
            set: Mutex::new(Some(
                serde_json::from_str(JWKS_JSON).expect("fixture JWKS parses"),
            )),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            set: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Replaces what later fetches return; `None` makes them fail.
    pub fn publish(&self, set: Option<JwkSet>) {
        *self.set.lock().expect("key set lock") = set;
    }
}

#[async_trait]
impl KeySetSource for StaticKeySet {
    async fn fetch(&self) -> anyhow::Result<JwkSet> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.set
            .lock()
            .expect("key set lock")
            .clone()
            .ok_or_else(|| anyhow::anyhow!("connect error: tcp connect to 10.0.0.7:443 refused"))
    }
}

pub(crate) fn claims_for(sub: &str, email: &str) -> Claims {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    Claims {
        sub: sub.into(),
        email: email.into(),
        role: "authenticated".into(),
        aud: "authenticated".into(),
        iat: now,
        exp: now + 3600,
    }
}

pub(crate) fn sign(claims: &Claims) -> String {
    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(KID.into());
    let key = EncodingKey::from_ec_pem(PRIVATE_KEY_PEM.as_bytes()).expect("fixture key parses");
    encode(&header, claims, &key).expect("token signs")
}

/// HS256 token using the symmetric secret listed in the fixture key set.
pub(crate) fn sign_hs256(claims: &Claims) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(LEGACY_KID.into());
    encode(&header, claims, &EncodingKey::from_secret(LEGACY_SECRET)).expect("token signs")
}
