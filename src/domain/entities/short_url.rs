//! ShortUrl entity: a slug mapped to a long URL, guarded by a secret key.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

/// A stored short URL.
///
/// Records are created once by the store and never modified. `id` is the
/// storage-assigned row id; `created_at` and `updated_at` are equal and carry
/// whole seconds only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct ShortUrl {
    pub id: i64,
    #[validate(length(equal = 6, message = "slug must be exactly 6 characters"))]
    pub slug: String,
    #[validate(length(min = 1, message = "long_url must not be empty"))]
    pub long_url: String,
    #[validate(length(min = 1, message = "secret_key must not be empty"))]
    pub secret_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortUrl {
    /// Public short link: `<base_url>/<slug>`.
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.slug)
    }

    /// Management link carrying the secret key.
    ///
    /// The key is URL-safe base64 and needs no escaping.
    pub fn manage_url(&self, base_url: &str) -> String {
        format!(
            "{}/manage/{}?secret={}",
            base_url.trim_end_matches('/'),
            self.slug,
            self.secret_key
        )
    }
}

/// Input for creating a short URL.
///
/// Only the long URL is caller-supplied; slug, secret key, id and timestamps
/// are assigned by the store.
#[derive(Debug, Clone, Validate)]
pub struct NewShortUrl {
    #[validate(length(min = 1, message = "long_url must not be empty"))]
    pub long_url: String,
}

impl NewShortUrl {
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
        }
    }
}

/// Filter for [`crate::domain::repositories::ShortUrlRepository::find_many`].
///
/// `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlFilter {
    pub slug: Option<String>,
}

impl ShortUrlFilter {
    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
        }
    }
}
