use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{UpsertConsentRequest, UserConsent};
use crate::{auth::Identity, error::AppError, state::AppState, validation::ValidJson};

pub fn consent_routes() -> Router<AppState> {
    Router::new().route("/consents", get(list_consents).post(upsert_consent))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn list_consents(
    State(state): State<AppState>,
    identity: Identity,
) -> Json<Vec<UserConsent>> {
    Json(state.consents.get_consents(&identity.user_id).await)
}

#[instrument(skip(state, identity, body), fields(user_id = %identity.user_id))]
pub async fn upsert_consent(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(body): ValidJson<UpsertConsentRequest>,
) -> Result<(StatusCode, Json<UserConsent>), AppError> {
    let consent = state
        .consents
        .upsert_consent(&identity.user_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(consent)))
}
