//! Helpers shared by the store and the service.
//!
//! - [`id_generator`] - Slug and secret-key generation
//! - [`clock`] - Injectable time source for transaction timestamps
//! - [`cancel`] - Caller-driven cancellation
//! - [`db_error`] - Classification of storage errors

pub mod cancel;
pub mod clock;
pub mod db_error;
pub mod id_generator;
