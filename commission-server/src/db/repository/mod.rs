//! Repository Module
//!
//! Free async functions over `&SqlitePool` (reads) or `&mut SqliteConnection`
//! (work that must share the caller's transaction).

// Upstream snapshot (read-only)
pub mod order;
pub mod user;

// Commission state
pub mod line;
pub mod period;
pub mod rate;
pub mod record;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Parse a decimal column stored as TEXT
pub(crate) fn parse_decimal(
    value: &str,
    column: &str,
    owner: impl std::fmt::Display,
) -> RepoResult<rust_decimal::Decimal> {
    crate::money::parse_amount(value)
        .ok_or_else(|| RepoError::Validation(format!("{owner}: unreadable {column} '{value}'")))
}
