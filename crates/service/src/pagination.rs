//! Pagination utilities for service layer
//!
//! Normalizes `page`/`limit` inputs and computes the metadata returned
//! alongside every page of results.

use serde::Serialize;

/// Largest row offset a store can be asked for (SQL `OFFSET` is a signed 64-bit value).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
}

impl Pagination {
    /// Coerce raw query values: missing or zero fall back to page 1 and
    /// `default_limit`, and `limit` never exceeds `max_limit`.
    ///
    /// `page` is capped at the last page whose offset still fits in
    /// [`MAX_OFFSET`]; such a page is simply empty.
    pub fn from_query(page: Option<u64>, limit: Option<u64>, default_limit: u64, max_limit: u64) -> Self {
        let limit = limit.filter(|l| *l > 0).unwrap_or(default_limit).clamp(1, max_limit.max(1));
        let last_addressable = MAX_OFFSET / limit + 1;
        let page = page.filter(|p| *p > 0).unwrap_or(1).min(last_addressable);
        Self { page, limit }
    }

    /// Rows to skip before this page, never above [`MAX_OFFSET`].
    pub fn skip(self) -> u64 { (self.page - 1).saturating_mul(self.limit).min(MAX_OFFSET) }

    /// Rows to take for this page.
    pub fn take(self) -> u64 { self.limit }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: 10 } }
}

/// Metadata describing one page of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
}

impl PageMeta {
    pub fn compute(p: Pagination, total_count: u64) -> Self {
        let last_page = total_count.div_ceil(p.limit);
        Self {
            page: p.page,
            limit: p.limit,
            total_count,
            previous_page: (p.page > 1).then(|| p.page - 1),
            next_page: (last_page > p.page).then(|| p.page + 1),
        }
    }
}

/// A page of items plus its metadata.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}
