//! Storage abstractions for service layer
//!
//! File persistence for uploaded product images.

pub mod file_store;

pub use file_store::{FileStore, LocalFileStore, Upload};
