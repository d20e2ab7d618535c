//! Categories products are linked to.

pub mod repository;
pub mod repo;

pub use repository::CategoryRepository;
