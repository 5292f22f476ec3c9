//! SQLite implementation of the short URL repository.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use validator::Validate;

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlFilter};
use crate::domain::repositories::{MAX_SLUG_ATTEMPTS, ShortUrlRepository};
use crate::error::AppError;
use crate::infrastructure::persistence::database::{Database, Tx};
use crate::utils::db_error::is_unique_violation_on_slug;
use crate::utils::id_generator::{IdGenerator, RandomIdGenerator};

/// Columns read for a [`ShortUrl`], in the order [`short_url_from_row`] expects.
const SHORT_URL_COLUMNS: &str = "id, slug, long_url, secret_key, created_at, updated_at";

/// SQLite repository for short URLs.
///
/// Slugs and secret keys come from the injected [`IdGenerator`]; timestamps
/// come from the transaction.
pub struct SqliteShortUrlRepository {
    db: Database,
    generator: Arc<dyn IdGenerator>,
}

impl SqliteShortUrlRepository {
    /// Creates a repository drawing identifiers from the OS random source.
    pub fn new(db: Database) -> Self {
        Self::with_generator(db, Arc::new(RandomIdGenerator))
    }

    pub fn with_generator(db: Database, generator: Arc<dyn IdGenerator>) -> Self {
        Self { db, generator }
    }
}

#[async_trait]
impl ShortUrlRepository for SqliteShortUrlRepository {
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        new_short_url.validate()?;

        let mut tx = self.db.begin_immediate().await?;

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = self.generator.slug()?;

            if slug_exists(tx.conn(), &slug).await? {
                tracing::debug!(attempt, slug = %slug, "slug collision, retrying");
                continue;
            }

            let mut short_url = ShortUrl {
                id: 0,
                slug,
                long_url: new_short_url.long_url.clone(),
                secret_key: self.generator.secret_key()?,
                created_at: tx.now(),
                updated_at: tx.now(),
            };
            short_url.validate()?;

            match insert(&mut tx, &short_url).await {
                Ok(id) => short_url.id = id,
                Err(e) if is_unique_violation_on_slug(&e) => {
                    tracing::warn!(
                        attempt,
                        slug = %short_url.slug,
                        "slug taken by concurrent insert, retrying"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            tx.commit().await?;

            tracing::info!(
                id = short_url.id,
                slug = %short_url.slug,
                attempt,
                "short url created"
            );
            return Ok(short_url);
        }

        tracing::warn!(attempts = MAX_SLUG_ATTEMPTS, "no free slug found");
        Err(AppError::SlugExhausted {
            attempts: MAX_SLUG_ATTEMPTS,
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<ShortUrl, AppError> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {SHORT_URL_COLUMNS} FROM short_urls WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(tx.conn())
        .await?;

        let short_url = row
            .as_ref()
            .map(short_url_from_row)
            .transpose()?
            .ok_or_else(|| AppError::not_found(slug))?;

        tx.commit().await?;
        Ok(short_url)
    }

    async fn find_many(&self, filter: ShortUrlFilter) -> Result<(Vec<ShortUrl>, i64), AppError> {
        let where_clause = if filter.slug.is_some() {
            "WHERE slug = ?"
        } else {
            ""
        };

        let mut tx = self.db.begin().await?;

        let select =
            format!("SELECT {SHORT_URL_COLUMNS} FROM short_urls {where_clause} ORDER BY id");
        let mut query = sqlx::query(&select);
        if let Some(slug) = &filter.slug {
            query = query.bind(slug);
        }
        let rows = query.fetch_all(tx.conn()).await?;

        let count_sql = format!("SELECT COUNT(*) FROM short_urls {where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(slug) = &filter.slug {
            count_query = count_query.bind(slug);
        }
        let total = count_query.fetch_one(tx.conn()).await?;

        tx.commit().await?;

        let short_urls = rows
            .iter()
            .map(short_url_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((short_urls, total))
    }
}

async fn slug_exists(conn: &mut SqliteConnection, slug: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM short_urls WHERE slug = ? LIMIT 1")
        .bind(slug)
        .fetch_optional(conn)
        .await?;

    Ok(row.is_some())
}

async fn insert(tx: &mut Tx, short_url: &ShortUrl) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO short_urls (slug, long_url, secret_key, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&short_url.slug)
    .bind(&short_url.long_url)
    .bind(&short_url.secret_key)
    .bind(short_url.created_at)
    .bind(short_url.updated_at)
    .execute(tx.conn())
    .await?;

    Ok(result.last_insert_rowid())
}

/// Maps a row selected with [`SHORT_URL_COLUMNS`] onto a [`ShortUrl`].
fn short_url_from_row(row: &SqliteRow) -> Result<ShortUrl, sqlx::Error> {
    Ok(ShortUrl {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        long_url: row.try_get("long_url")?,
        secret_key: row.try_get("secret_key")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
