use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::{claims::Identity, dto::Profile};
use crate::{error::AppError, state::AppState};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Profile>, AppError> {
    let profile = state.profiles.get_profile(&identity.user_id).await?;
    Ok(Json(profile))
}
