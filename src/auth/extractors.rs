use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::claims::Identity;
use crate::{error::AppError, state::AppState};

/// First step of every protected route: verify the bearer token and attach
/// the caller's [`Identity`] to the request.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = match state.verifier.authenticate(authorization).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, path = %req.uri().path(), "request rejected");
            return Err(AppError::Unauthenticated);
        }
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Present only on routes layered with `require_identity`.
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}
