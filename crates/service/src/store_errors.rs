//! Translation from persistence-layer failures to [`ServiceError`].
//!
//! Only two store signals carry domain meaning: a unique-constraint
//! violation and "the row to modify/delete does not exist". Everything
//! else stays opaque and surfaces as [`ServiceError::Db`].

use sea_orm::{DbErr, SqlErr};

use crate::errors::ServiceError;

/// What the store told us, independent of the driver's error shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSignal {
    /// Raw driver message of the violated unique constraint.
    UniqueViolation(String),
    NotFoundOnWrite(String),
    Other(String),
}

/// Unique indexes and the columns they guard. Keep in sync with the
/// `add_indexes` migration.
pub const UNIQUE_CONSTRAINTS: &[(&str, &[&str])] = &[
    ("idx_product_slug", &["slug"]),
    ("idx_category_name", &["name"]),
    ("pk_product_category", &["productId", "categoryId"]),
];

/// Classify a SeaORM error.
pub fn classify(err: &DbErr) -> StoreSignal {
    if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
        return StoreSignal::UniqueViolation(msg);
    }
    match err {
        DbErr::RecordNotFound(msg) => StoreSignal::NotFoundOnWrite(msg.clone()),
        DbErr::RecordNotUpdated => StoreSignal::NotFoundOnWrite("record not updated".into()),
        other => StoreSignal::Other(other.to_string()),
    }
}

/// Map a store signal to the domain error it stands for.
pub fn to_service_error(signal: StoreSignal) -> ServiceError {
    match signal {
        StoreSignal::UniqueViolation(msg) => ServiceError::UniqueConstraint { fields: unique_fields(&msg) },
        StoreSignal::NotFoundOnWrite(msg) => ServiceError::NotFound(msg),
        StoreSignal::Other(msg) => ServiceError::Db(msg),
    }
}

pub fn translate(err: &DbErr) -> ServiceError {
    to_service_error(classify(err))
}

/// Resolve the offending field names from a driver message.
///
/// Known constraint names win; otherwise a Postgres `Key (a, b)=(..)`
/// detail is parsed; otherwise the quoted constraint name is returned.
pub fn unique_fields(msg: &str) -> Vec<String> {
    for (constraint, fields) in UNIQUE_CONSTRAINTS {
        if msg.contains(constraint) {
            return fields.iter().map(|f| f.to_string()).collect();
        }
    }
    if let Some(start) = msg.find("Key (") {
        let rest = &msg[start + 5..];
        if let Some(end) = rest.find(")=") {
            return rest[..end].split(',').map(|c| c.trim().to_string()).collect();
        }
    }
    if let Some(start) = msg.find('"') {
        let rest = &msg[start + 1..];
        if let Some(end) = rest.find('"') {
            return vec![rest[..end].to_string()];
        }
    }
    vec!["unknown".to_string()]
}
