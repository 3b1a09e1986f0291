//! Error types for the blog API
//!
//! All errors use thiserror for structured error handling.
//! `AppError` is also the single translator from failures to HTTP
//! responses: every handler returns it and `IntoResponse` picks the
//! status code and the `{status, error}` body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Malformatted 'id': '{value}'(string) is not of type Uuid")]
    MalformedId { value: String },

    /// Request the HTTP layer could not extract, with the status it chose
    #[error("{message}")]
    Rejection { status: StatusCode, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::MalformedId { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Rejection { status, .. } => *status,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Database(_) | AppError::Io(_) | AppError::Generic(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Body sent to clients for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error = match &self {
            // Driver and filesystem details stay in the logs
            AppError::Database(_) | AppError::Io(_) => {
                tracing::error!("Request failed: {}", self);
                "Internal Server Error".to_string()
            }
            AppError::Generic(message) => {
                tracing::error!("Request failed: {}", message);
                message.clone()
            }
            other => {
                tracing::debug!("Request rejected ({}): {}", status, other);
                other.to_string()
            }
        };

        let body = ErrorBody {
            status: status.as_u16(),
            error,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejection {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejection {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
