//! Domain layer: entities and repository contracts, free of storage details.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions

pub mod entities;
pub mod repositories;
