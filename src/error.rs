//! Error taxonomy shared by the store, the service and the CLI.

use sqlx::migrate::MigrateError;
use thiserror::Error;
use validator::ValidationErrors;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed business rules. Every violated rule is listed.
    #[error("validation failed: {}", violations.join("; "))]
    Validation { violations: Vec<String> },

    #[error("short url not found: {slug}")]
    NotFound { slug: String },

    /// No free slug was found within the attempt bound.
    #[error("no free slug after {attempts} attempts")]
    SlugExhausted { attempts: usize },

    #[error("random source failed: {0}")]
    RandomSource(String),

    /// Transaction, connection or pool failure.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("migration failed: {0}")]
    Migration(String),
}

impl AppError {
    pub fn validation(violation: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![violation.into()],
        }
    }

    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }

    /// Wraps a failure to open a connection or transaction.
    pub fn storage_unavailable(e: sqlx::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }

    /// Returns true when the error is caller-correctable input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<MigrateError> for AppError {
    fn from(e: MigrateError) -> Self {
        Self::Migration(e.to_string())
    }
}

impl From<getrandom::Error> for AppError {
    fn from(e: getrandom::Error) -> Self {
        Self::RandomSource(e.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        violations.sort();

        Self::Validation { violations }
    }
}

/// Maps a sqlx error onto the taxonomy.
///
/// Pool and transport failures mean the store could not be reached at all;
/// everything else is a failed statement.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_) => AppError::storage_unavailable(e),
        other => AppError::Database(other.to_string()),
    }
}
