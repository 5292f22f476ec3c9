//! Core domain entities.
//!
//! - [`ShortUrl`] - A stored slug → long URL mapping with its secret key
//! - [`NewShortUrl`] - Creation input (long URL only)
//! - [`ShortUrlFilter`] - Lookup filter

pub mod short_url;

pub use short_url::{NewShortUrl, ShortUrl, ShortUrlFilter};
