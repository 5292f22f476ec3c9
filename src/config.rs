//! Configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the database
//! is opened.
//!
//! ## Variables
//!
//! - `DATABASE_URL` - SQLite URL (default: `sqlite::memory:`), e.g. `sqlite://data/suss.db`
//! - `DB_MAX_CONNECTIONS` - Pool size for file databases (default: 10)
//! - `DB_BUSY_TIMEOUT_MS` - How long a connection waits on a locked database (default: 5000)
//! - `DB_ACQUIRE_TIMEOUT` - Seconds to wait for a pooled connection (default: 30)
//! - `BASE_URL` - Public origin of short links (default: `http://localhost:8080`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub base_url: String,
    pub log_level: String,
    pub log_format: String,
}

/// Settings for [`crate::infrastructure::persistence::Database::connect`].
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Ignored for in-memory databases, which always use a single connection.
    pub max_connections: u32,
    /// SQLite busy timeout applied to every connection.
    pub busy_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 10,
            busy_timeout: Duration::from_millis(5000),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = DatabaseConfig::default();

        let url = env::var("DATABASE_URL").unwrap_or(defaults.url);

        let max_connections =
            parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);

        let busy_timeout = parse_var("DB_BUSY_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.busy_timeout);

        let acquire_timeout = parse_var("DB_ACQUIRE_TIMEOUT")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.acquire_timeout);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections,
                busy_timeout,
                acquire_timeout,
            },
            base_url,
            log_level,
            log_format,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is not a SQLite URL
    /// - `DB_MAX_CONNECTIONS`, `DB_BUSY_TIMEOUT_MS` or `DB_ACQUIRE_TIMEOUT` is zero
    /// - `BASE_URL` is not an http(s) origin
    /// - `LOG_FORMAT` is not `text` or `json`
    pub fn validate(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            anyhow::bail!(
                "DATABASE_URL must start with 'sqlite:', got '{}'",
                self.database.url
            );
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.database.busy_timeout.is_zero() {
            anyhow::bail!("DB_BUSY_TIMEOUT_MS must be greater than 0");
        }
        if self.database.acquire_timeout.is_zero() {
            anyhow::bail!("DB_ACQUIRE_TIMEOUT must be greater than 0");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        Ok(())
    }

    /// Logs a configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Database: {}", self.database.url);
        tracing::info!("  Max connections: {}", self.database.max_connections);
        tracing::info!("  Busy timeout: {:?}", self.database.busy_timeout);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Reads and parses an optional variable. Unset means `None`; set but
/// unparseable is an error.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value: '{raw}'")),
        Err(_) => Ok(None),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
