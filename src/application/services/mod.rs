//! Application services orchestrating repository calls.
//!
//! - [`ShortUrlService`] - Shortening, resolution and secret-key guarded management

pub mod short_url_service;

pub use short_url_service::ShortUrlService;
