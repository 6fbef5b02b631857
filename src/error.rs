use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const RETRY_MESSAGE: &str =
    "The academic service could not complete the request. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Academic service error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Message shown to the person filling in the form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Lookup(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Backend(_) | AppError::Http(_) => RETRY_MESSAGE.to_string(),
            AppError::NotFound => "Not Found".to_string(),
            AppError::Config(_) => "Internal server error".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Lookup(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Backend(e) => {
                error!("academic service error: {}", e);
                StatusCode::BAD_GATEWAY
            }
            AppError::Http(e) => {
                error!("academic service transport error: {}", e);
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(e) => {
                error!("configuration error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.user_message(),
        });

        (status, body).into_response()
    }
}
