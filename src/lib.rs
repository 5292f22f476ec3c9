//! # suss
//!
//! Storage core of a URL shortener backed by SQLite.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - The short URL entity and the repository trait
//! - **Application Layer** ([`application`]) - Shortening, resolution and secret-key checks
//! - **Infrastructure Layer** ([`infrastructure`]) - SQLite pool, migrations and the repository
//! - **Utilities** ([`utils`]) - Identifier generation, clock, cancellation
//!
//! ## Features
//!
//! - Random 6-character slugs from an unambiguous alphabet
//! - 256-bit secret keys for management access
//! - Transactional creation with bounded slug-collision retry
//! - Caller-driven cancellation of any store operation
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL="sqlite://data/suss.db"
//!
//! cargo run -- create https://example.com
//! cargo run -- get <slug>
//! ```
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod utils;

pub use error::{AppError, Result};

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::ShortUrlService;
    pub use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlFilter};
    pub use crate::domain::repositories::ShortUrlRepository;
    pub use crate::error::AppError;
    pub use crate::infrastructure::persistence::{Database, MIGRATOR, SqliteShortUrlRepository};
    pub use crate::utils::cancel::cancellable;
}
