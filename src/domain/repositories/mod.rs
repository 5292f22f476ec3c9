//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for service tests.

pub mod short_url_repository;

pub use short_url_repository::{MAX_SLUG_ATTEMPTS, ShortUrlRepository};

#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
