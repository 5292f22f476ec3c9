//! SQLite connection pool, migrations and transactions.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, SqliteConnection, Transaction};

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::utils::clock::{Clock, SystemClock, now_truncated};

/// Embedded schema migrations, applied in version order.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Shared handle to the database.
///
/// Cloning is cheap; all clones share one pool and one clock.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl Database {
    /// Opens a pool for `config.url`.
    ///
    /// Every connection gets foreign keys, `synchronous = NORMAL`, an
    /// in-memory temp store and the configured busy timeout. File databases
    /// additionally use WAL and have their parent directory created.
    /// In-memory databases are limited to one connection that is never
    /// recycled, since each SQLite connection would otherwise see its own
    /// empty database.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if the URL is malformed or the
    /// database cannot be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let in_memory = is_in_memory(&config.url);

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(AppError::storage_unavailable)?
            .create_if_missing(true)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .pragma("temp_store", "memory");

        let mut pool_options =
            SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);

        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            create_parent_dir(options.get_filename())?;
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.max_connections(config.max_connections);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(AppError::storage_unavailable)?;

        tracing::info!(in_memory, "Connected to database");

        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool, using the system clock.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used to stamp transactions.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Applies every pending migration from `migrator`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Migration`] if a migration fails.
    pub async fn migrate(&self, migrator: &Migrator) -> Result<()> {
        migrator.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs `SELECT 1` against the pool.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Opens a deferred transaction, used for reads.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if no transaction could be opened.
    pub async fn begin(&self) -> Result<Tx> {
        let inner = self
            .pool
            .begin()
            .await
            .map_err(AppError::storage_unavailable)?;

        Ok(Tx::new(inner, now_truncated(self.clock.as_ref())))
    }

    /// Opens a transaction holding SQLite's write lock from the start.
    ///
    /// Concurrent writers queue on the busy timeout here instead of failing
    /// later when a read snapshot would have to be upgraded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if no transaction could be opened.
    pub async fn begin_immediate(&self) -> Result<Tx> {
        let inner = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(AppError::storage_unavailable)?;

        Ok(Tx::new(inner, now_truncated(self.clock.as_ref())))
    }
}

/// A unit of work: an open transaction plus the timestamp captured when it
/// was opened.
///
/// Dropping a `Tx` without [`Tx::commit`] rolls it back.
pub struct Tx {
    inner: Transaction<'static, Sqlite>,
    now: DateTime<Utc>,
}

impl Tx {
    fn new(inner: Transaction<'static, Sqlite>, now: DateTime<Utc>) -> Self {
        Self { inner, now }
    }

    /// Time the transaction was opened, whole seconds, UTC.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Connection to run statements on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.inner
    }

    pub async fn commit(self) -> Result<()> {
        self.inner.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn create_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "cannot create directory {}: {e}",
                    parent.display()
                ))
            })
        }
        _ => Ok(()),
    }
}
