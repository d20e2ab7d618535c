//! Shared building blocks for the catalog crates: logging setup, startup
//! directory checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;
