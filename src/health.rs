use axum::{routing::get, Json, Router};
use serde::Serialize;
use time::OffsetDateTime;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Liveness only; touches neither the store nor the key set.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: OffsetDateTime::now_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ok_with_a_parseable_timestamp() {
        let Json(body) = health().await;
        let value = serde_json::to_value(&body).expect("serializes");

        assert_eq!(value["status"], "ok");
        let stamp = value["timestamp"].as_str().expect("timestamp is a string");
        OffsetDateTime::parse(stamp, &time::format_description::well_known::Rfc3339)
            .expect("rfc3339 timestamp");
    }
}
