//! Repository Module
//!
//! Free functions over `&SqlitePool`, one module per table. Instants
//! are stored as `i64` Unix millis; dates as `YYYY-MM-DD` text.

pub mod attendance;
pub mod member;
pub mod sync_state;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
