//! Product catalog: domain types, repository abstraction and the service
//! owning slug derivation, pagination and the image lifecycle.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{Product, ProductKey};
pub use service::ProductService;
