//! Repository trait for short URL storage.

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlFilter};
use crate::error::AppError;
use async_trait::async_trait;

/// Upper bound on slug candidates tried by a single `create` call.
pub const MAX_SLUG_ATTEMPTS: usize = 10;

/// Transactional store of short URLs.
///
/// Every operation runs in its own transaction. Implementations are shared
/// across tasks and must be safe to call concurrently.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteShortUrlRepository`] - SQLite implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Creates a record with a freshly allocated slug and secret key.
    ///
    /// Up to [`MAX_SLUG_ATTEMPTS`] slugs are tried; each is checked against
    /// existing rows inside the same transaction. The returned record carries
    /// the storage-assigned id. On any error nothing is written.
    ///
    /// # Errors
    ///
    /// - [`AppError::SlugExhausted`] if every candidate slug was taken
    /// - [`AppError::RandomSource`] if slug or secret generation fails
    /// - [`AppError::Validation`] if the assembled record breaks a rule
    /// - [`AppError::StorageUnavailable`] / [`AppError::Database`] on storage failures
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Finds the record with exactly this slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has the slug.
    async fn find_by_slug(&self, slug: &str) -> Result<ShortUrl, AppError>;

    /// Returns all records matching `filter` in insertion order, together
    /// with the number of matches.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] / [`AppError::Database`] on storage failures.
    async fn find_many(&self, filter: ShortUrlFilter) -> Result<(Vec<ShortUrl>, i64), AppError>;
}
