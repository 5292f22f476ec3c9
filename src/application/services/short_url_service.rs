//! Short URL creation, resolution and management.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlFilter};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

/// Service used by callers of the store (HTTP layer, CLI).
///
/// Normalizes input, delegates persistence to the repository and guards
/// management access with the record's secret key.
pub struct ShortUrlService<R: ShortUrlRepository> {
    repository: Arc<R>,
    base_url: String,
}

impl<R: ShortUrlRepository> ShortUrlService<R> {
    /// Creates a new service.
    ///
    /// `base_url` is the public origin short links are served from.
    pub fn new(repository: Arc<R>, base_url: impl Into<String>) -> Self {
        Self {
            repository,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shortens `long_url`.
    ///
    /// Surrounding whitespace is trimmed before storing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is empty, and passes
    /// through every store error (see [`ShortUrlRepository::create`]).
    pub async fn shorten(&self, long_url: &str) -> Result<ShortUrl, AppError> {
        let long_url = long_url.trim();
        if long_url.is_empty() {
            return Err(AppError::validation("long_url must not be empty"));
        }

        self.repository.create(NewShortUrl::new(long_url)).await
    }

    /// Returns the long URL a slug redirects to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug is unknown.
    pub async fn resolve(&self, slug: &str) -> Result<String, AppError> {
        let short_url = self.repository.find_by_slug(slug).await?;
        Ok(short_url.long_url)
    }

    /// Loads a record for management after checking its secret key.
    ///
    /// The comparison runs in constant time.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidSecretKey`] if `secret_key` is empty or does not match
    /// - [`AppError::NotFound`] if the slug is unknown
    pub async fn manage(&self, slug: &str, secret_key: &str) -> Result<ShortUrl, AppError> {
        if secret_key.is_empty() {
            return Err(AppError::InvalidSecretKey);
        }

        let short_url = self.repository.find_by_slug(slug).await?;

        let matches: bool = short_url
            .secret_key
            .as_bytes()
            .ct_eq(secret_key.as_bytes())
            .into();

        if !matches {
            tracing::warn!(slug, "rejected management access: secret key mismatch");
            return Err(AppError::InvalidSecretKey);
        }

        Ok(short_url)
    }

    /// Lists records matching `filter` with the total match count.
    pub async fn list(&self, filter: ShortUrlFilter) -> Result<(Vec<ShortUrl>, i64), AppError> {
        self.repository.find_many(filter).await
    }

    /// Public short link for `short_url`.
    pub fn short_url_for(&self, short_url: &ShortUrl) -> String {
        short_url.short_url(&self.base_url)
    }

    /// Management link for `short_url`, including its secret key.
    pub fn manage_url_for(&self, short_url: &ShortUrl) -> String {
        short_url.manage_url(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockShortUrlRepository;
    use chrono::{TimeZone, Utc};

    fn create_test_short_url(id: i64, slug: &str, url: &str) -> ShortUrl {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ShortUrl {
            id,
            slug: slug.to_string(),
            long_url: url.to_string(),
            secret_key: "correct-secret".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(repo: MockShortUrlRepository) -> ShortUrlService<MockShortUrlRepository> {
        ShortUrlService::new(Arc::new(repo), "https://s.example.com")
    }

    #[tokio::test]
    async fn test_shorten_success() {
        let mut mock_repo = MockShortUrlRepository::new();

        let created = create_test_short_url(10, "abc234", "https://example.com");
        mock_repo
            .expect_create()
            .withf(|new| new.long_url == "https://example.com")
            .times(1)
            .returning(move |_| Ok(created.clone()));

        let short_url = service(mock_repo)
            .shorten("https://example.com")
            .await
            .unwrap();

        assert_eq!(short_url.id, 10);
        assert_eq!(short_url.slug, "abc234");
    }

    #[tokio::test]
    async fn test_shorten_trims_input() {
        let mut mock_repo = MockShortUrlRepository::new();

        let created = create_test_short_url(1, "abc234", "https://example.com/path");
        mock_repo
            .expect_create()
            .withf(|new| new.long_url == "https://example.com/path")
            .times(1)
            .returning(move |_| Ok(created.clone()));

        let result = service(mock_repo)
            .shorten("  https://example.com/path\n")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_shorten_rejects_empty_url() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo.expect_create().times(0);

        let result = service(mock_repo).shorten("   ").await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_shorten_passes_store_errors_through() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::SlugExhausted { attempts: 10 }));

        let result = service(mock_repo).shorten("https://example.com").await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::SlugExhausted { attempts: 10 }
        ));
    }

    #[tokio::test]
    async fn test_resolve_returns_long_url() {
        let mut mock_repo = MockShortUrlRepository::new();

        let found = create_test_short_url(3, "abc234", "https://rust-lang.org");
        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "abc234")
            .times(1)
            .returning(move |_| Ok(found.clone()));

        let long_url = service(mock_repo).resolve("abc234").await.unwrap();

        assert_eq!(long_url, "https://rust-lang.org");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo
            .expect_find_by_slug()
            .times(1)
            .returning(|slug| Err(AppError::not_found(slug)));

        let result = service(mock_repo).resolve("zzzzzz").await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_manage_with_correct_secret() {
        let mut mock_repo = MockShortUrlRepository::new();

        let found = create_test_short_url(3, "abc234", "https://example.com");
        mock_repo
            .expect_find_by_slug()
            .times(1)
            .returning(move |_| Ok(found.clone()));

        let short_url = service(mock_repo)
            .manage("abc234", "correct-secret")
            .await
            .unwrap();

        assert_eq!(short_url.id, 3);
    }

    #[tokio::test]
    async fn test_manage_with_wrong_secret() {
        let mut mock_repo = MockShortUrlRepository::new();

        let found = create_test_short_url(3, "abc234", "https://example.com");
        mock_repo
            .expect_find_by_slug()
            .times(1)
            .returning(move |_| Ok(found.clone()));

        let result = service(mock_repo).manage("abc234", "wrong-secret").await;

        assert!(matches!(result.unwrap_err(), AppError::InvalidSecretKey));
    }

    #[tokio::test]
    async fn test_manage_with_empty_secret_skips_lookup() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo.expect_find_by_slug().times(0);

        let result = service(mock_repo).manage("abc234", "").await;

        assert!(matches!(result.unwrap_err(), AppError::InvalidSecretKey));
    }

    #[tokio::test]
    async fn test_list_passes_filter() {
        let mut mock_repo = MockShortUrlRepository::new();

        let found = create_test_short_url(3, "abc234", "https://example.com");
        mock_repo
            .expect_find_many()
            .withf(|filter| filter.slug.as_deref() == Some("abc234"))
            .times(1)
            .returning(move |_| Ok((vec![found.clone()], 1)));

        let (items, total) = service(mock_repo)
            .list(ShortUrlFilter::by_slug("abc234"))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_links_use_base_url() {
        let service = service(MockShortUrlRepository::new());
        let short_url = create_test_short_url(3, "abc234", "https://example.com");

        assert_eq!(
            service.short_url_for(&short_url),
            "https://s.example.com/abc234"
        );
        assert_eq!(
            service.manage_url_for(&short_url),
            "https://s.example.com/manage/abc234?secret=correct-secret"
        );
        assert_eq!(service.base_url(), "https://s.example.com");
    }
}
