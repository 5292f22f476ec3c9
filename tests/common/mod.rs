#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use suss::config::DatabaseConfig;
use suss::infrastructure::persistence::{Database, MIGRATOR, SqliteShortUrlRepository};
use suss::utils::clock::Clock;
use suss::utils::id_generator::{IdGenerator, generate_secret_key, generate_slug};
use tempfile::TempDir;
use tokio::sync::oneshot;

pub fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        busy_timeout: Duration::from_secs(5),
        acquire_timeout: Duration::from_secs(5),
    }
}

/// Migrated in-memory database backed by a single connection.
pub async fn setup_memory_db() -> Database {
    let db = Database::connect(&memory_config()).await.unwrap();
    db.migrate(&MIGRATOR).await.unwrap();
    db
}

/// Migrated file database with `max_connections` pooled connections.
///
/// Keep the returned [`TempDir`] alive for as long as the database is used.
pub async fn setup_file_db(max_connections: u32) -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("suss.db").display()),
        max_connections,
        ..memory_config()
    };

    let db = Database::connect(&config).await.unwrap();
    db.migrate(&MIGRATOR).await.unwrap();
    (db, dir)
}

pub fn create_test_repo(db: &Database, generator: Arc<dyn IdGenerator>) -> SqliteShortUrlRepository {
    SqliteShortUrlRepository::with_generator(db.clone(), generator)
}

pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

/// Inserts a record directly, bypassing the repository.
pub async fn insert_short_url(db: &Database, slug: &str, long_url: &str) -> i64 {
    let now = test_time();
    sqlx::query(
        "INSERT INTO short_urls (slug, long_url, secret_key, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(slug)
    .bind(long_url)
    .bind(format!("secret-{slug}"))
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap()
    .last_insert_rowid()
}

pub async fn count_short_urls(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// Clock returning a fixed instant and counting how often it is read.
pub struct FixedClock {
    now: DateTime<Utc>,
    calls: AtomicUsize,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.now
    }
}

/// Clock that moves forward by `step` on every read.
pub struct SteppingClock {
    start: DateTime<Utc>,
    step: chrono::Duration,
    calls: AtomicUsize,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
        Self {
            start,
            step,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as i32;
        self.start + self.step * n
    }
}

/// Generator that hands out queued slugs first, then random ones.
///
/// With [`SequenceGenerator::always`] the same slug is returned forever.
/// Call counts are recorded for both identifiers.
pub struct SequenceGenerator {
    slugs: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    slug_calls: AtomicUsize,
    secret_calls: AtomicUsize,
}

impl SequenceGenerator {
    pub fn new<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slugs: Mutex::new(slugs.into_iter().map(Into::into).collect()),
            repeat: None,
            slug_calls: AtomicUsize::new(0),
            secret_calls: AtomicUsize::new(0),
        }
    }

    pub fn always(slug: &str) -> Self {
        Self {
            repeat: Some(slug.to_string()),
            ..Self::new(Vec::<String>::new())
        }
    }

    pub fn slug_calls(&self) -> usize {
        self.slug_calls.load(Ordering::SeqCst)
    }

    pub fn secret_calls(&self) -> usize {
        self.secret_calls.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequenceGenerator {
    fn slug(&self) -> suss::Result<String> {
        self.slug_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(slug) = &self.repeat {
            return Ok(slug.clone());
        }

        match self.slugs.lock().unwrap().pop_front() {
            Some(slug) => Ok(slug),
            None => generate_slug(),
        }
    }

    fn secret_key(&self) -> suss::Result<String> {
        self.secret_calls.fetch_add(1, Ordering::SeqCst);
        generate_secret_key()
    }
}

/// Random generator that fires a one-shot signal the first time a slug is
/// drawn. At that point `create` already holds the write lock.
pub struct NotifyingGenerator {
    slug_drawn: Mutex<Option<oneshot::Sender<()>>>,
}

impl NotifyingGenerator {
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let generator = Self {
            slug_drawn: Mutex::new(Some(tx)),
        };
        (generator, rx)
    }
}

impl IdGenerator for NotifyingGenerator {
    fn slug(&self) -> suss::Result<String> {
        if let Some(tx) = self.slug_drawn.lock().unwrap().take() {
            let _ = tx.send(());
        }
        generate_slug()
    }

    fn secret_key(&self) -> suss::Result<String> {
        generate_secret_key()
    }
}
