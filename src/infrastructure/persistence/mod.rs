//! SQLite persistence.
//!
//! - [`Database`] - Connection pool, migrations and transactions
//! - [`SqliteShortUrlRepository`] - Short URL storage and retrieval

pub mod database;
pub mod sqlite_short_url_repository;

pub use database::{Database, MIGRATOR, Tx};
pub use sqlite_short_url_repository::SqliteShortUrlRepository;
