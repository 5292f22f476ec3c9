//! Infrastructure layer implementing the domain's repository contracts.
//!
//! - [`persistence`] - SQLite database handle and repository implementation

pub mod persistence;
