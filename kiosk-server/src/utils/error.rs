//! Unified error handling
//!
//! [`AppError`] is the application-level error taxonomy. Everything in
//! it is recoverable by retrying the triggering action: punch errors
//! go back to the kiosk operator, sync errors go back to the
//! scheduler, which retries on its next cycle.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// Application error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Identifier or member unresolvable (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Debounce guard tripped: the open record was created moments ago (422)
    #[error("Too soon: {0}")]
    TooSoon(String),

    /// Malformed caller input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or expired credentials (401)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network failure talking to the remote API (502)
    #[error("Network error: {0}")]
    Transport(String),

    /// Remote API returned a non-success status, a malformed body, or
    /// rejected entries in a sync batch (502)
    #[error("Remote API error: {0}")]
    Server(String),

    /// Record store failure (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn too_soon(msg: impl Into<String>) -> Self {
        Self::TooSoon(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::TooSoon(_) => (StatusCode::UNPROCESSABLE_ENTITY, "too_soon"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "auth_error"),
            AppError::Transport(_) => (StatusCode::BAD_GATEWAY, "transport_error"),
            AppError::Server(_) => (StatusCode::BAD_GATEWAY, "remote_error"),
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: kind,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Application-level Result type
pub type AppResult<T> = Result<T, AppError>;
