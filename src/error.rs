use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Failures raised by the profile and consent services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Profile not found for user {user_id}")]
    ProfileNotFound { user_id: String },
    #[error("Failed to save consent: {detail}")]
    ConsentNotSaved { user_id: String, detail: String },
}

/// Errors as the HTTP layer renders them. Messages here are client-safe.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("{0}")]
    NotFound(String),
    #[error("Validation failed")]
    Validation(ValidationErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(&'static str),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            // Safe to echo: the id is always the caller's own.
            ServiceError::ProfileNotFound { .. } => AppError::NotFound(err.to_string()),
            ServiceError::ConsentNotSaved { .. } => AppError::Internal("Failed to save consent"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");
        let body = match &self {
            AppError::Validation(v) => json!({
                "statusCode": status.as_u16(),
                "message": self.to_string(),
                "error": reason,
                "errors": v.errors,
            }),
            _ => json!({
                "statusCode": status.as_u16(),
                "message": self.to_string(),
                "error": reason,
            }),
        };
        (status, Json(body)).into_response()
    }
}
