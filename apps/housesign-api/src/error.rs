//! Error types for the HouseSign API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use housesign_core::SignError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Sign(#[from] SignError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::DocumentNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("document not found: {}", id))
            }
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Sign(e) => (sign_error_status(e), e.to_string()),
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Map the core error taxonomy onto HTTP: validation -> 400,
/// authorization -> 403, state conflicts -> 409, expired window -> 410,
/// missing entities -> 404, storage -> 500.
fn sign_error_status(err: &SignError) -> StatusCode {
    match err {
        SignError::FieldLimitReached
        | SignError::MissingRecipient
        | SignError::InvalidUpload(_)
        | SignError::InvalidSignatureImage(_) => StatusCode::BAD_REQUEST,
        SignError::NotAuthorized => StatusCode::FORBIDDEN,
        SignError::AlreadySigned | SignError::NotSigned => StatusCode::CONFLICT,
        SignError::RevocationWindowExpired => StatusCode::GONE,
        SignError::DocumentNotFound(_) | SignError::FieldNotFound(_) => StatusCode::NOT_FOUND,
        SignError::Serialization(_) | SignError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
