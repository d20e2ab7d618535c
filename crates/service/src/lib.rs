//! Service layer providing the product catalog operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Translates store failures into [`errors::ServiceError`].

pub mod errors;
pub mod store_errors;
pub mod pagination;
pub mod storage;
pub mod category;
pub mod product;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
