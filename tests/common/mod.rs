#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;

use consent_api::{
    app::build_app,
    auth::{jwks::KeyCache, jwks::KeySetSource, TokenVerifier},
    config::AppConfig,
    db::MemoryStore,
    state::AppState,
};

pub const USER_ID: &str = "0b7c1f5e-3d2a-4a8e-9c61-5f0e2d9b7a10";
pub const EMAIL: &str = "ada@example.com";

const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/es256_private.pem");
const JWKS_JSON: &str = include_str!("../fixtures/jwks.json");

struct FixtureKeys;

#[async_trait]
impl KeySetSource for FixtureKeys {
    async fn fetch(&self) -> anyhow::Result<JwkSet> {
        Ok(serde_json::from_str(JWKS_JSON)?)
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://unused/test".into()),
            "SUPABASE_URL" => Some("https://project.supabase.test".into()),
            _ => None,
        })
        .expect("test config");

        let keys = KeyCache::new(
            Arc::new(FixtureKeys),
            60,
            Duration::from_secs(config.auth.jwks_cache_ttl_secs),
        );
        let verifier = Arc::new(TokenVerifier::new(keys, &config.auth.audience));
        let store = Arc::new(MemoryStore::new());
        let state = AppState::from_parts(
            Arc::new(config),
            verifier,
            store.clone(),
            store.clone(),
        );

        Self {
            router: build_app(state),
            store,
        }
    }

    pub async fn with_profile() -> Self {
        let app = Self::new();
        let row = json!({
            "id": USER_ID,
            "email": EMAIL,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "locale": "en-GB",
            "created_at": "2024-01-01T00:00:00Z",
        });
        if let Value::Object(row) = row {
            app.store.insert_profile(row).await;
        }
        app
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let res = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request builds"))
            .await
            .expect("router responds");
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }
}

fn claims(sub: &str, expires_in: i64) -> Value {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    json!({
        "sub": sub,
        "email": EMAIL,
        "role": "authenticated",
        "aud": "authenticated",
        "iat": now,
        "exp": now + expires_in,
    })
}

pub fn token_for(sub: &str) -> String {
    sign_es256(&claims(sub, 3600))
}

pub fn expired_token() -> String {
    sign_es256(&claims(USER_ID, -60))
}

/// Signed with the symmetric secret published alongside the EC key.
pub fn hs256_token() -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some("legacy-hs256".into());
    encode(
        &header,
        &claims(USER_ID, 3600),
        &EncodingKey::from_secret(b"legacy-shared-secret"),
    )
    .expect("token signs")
}

fn sign_es256(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some("test-es256".into());
    let key = EncodingKey::from_ec_pem(PRIVATE_KEY_PEM.as_bytes()).expect("fixture key parses");
    encode(&header, claims, &key).expect("token signs")
}
