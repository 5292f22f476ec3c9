//! Application layer: business operations on top of the repositories.

pub mod services;
