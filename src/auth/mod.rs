use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod jwks;
pub mod jwt;
pub mod repo;
pub mod services;
#[cfg(test)]
pub(crate) mod testing;

pub use claims::Identity;
pub use jwt::TokenVerifier;

/// Routes that need an authenticated caller.
pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::me_routes())
}
