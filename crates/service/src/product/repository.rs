use async_trait::async_trait;

use super::domain::{NewProduct, Product, ProductChanges};
use crate::errors::ServiceError;

/// Persistence contract for products.
///
/// Implementations report a duplicate slug as
/// [`ServiceError::UniqueConstraint`], a missing row on update/delete as
/// [`ServiceError::NotFound`], and unknown category ids as
/// [`ServiceError::Validation`].
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Number of products, unfiltered.
    async fn count(&self) -> Result<u64, ServiceError>;
    /// Products newest first.
    async fn find_page(&self, skip: u64, take: u64) -> Result<Vec<Product>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ServiceError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError>;
    async fn create(&self, input: NewProduct) -> Result<Product, ServiceError>;
    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Product, ServiceError>;
    /// Delete and return the removed record.
    async fn delete(&self, id: i32) -> Result<Product, ServiceError>;
}

/// In-memory repository for tests and doc examples
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    use chrono::Utc;
    use models::product;

    use crate::category::repository::memory::InMemoryCategoryRepository;

    #[derive(Default)]
    struct State {
        rows: BTreeMap<i32, product::Model>,
        links: BTreeMap<i32, Vec<i32>>,
        next_id: i32,
    }

    pub struct InMemoryProductRepository {
        state: Mutex<State>,
        categories: Arc<InMemoryCategoryRepository>,
    }

    impl InMemoryProductRepository {
        pub fn new(categories: Arc<InMemoryCategoryRepository>) -> Self {
            Self { state: Mutex::new(State::default()), categories }
        }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn expand(&self, row: product::Model, links: &[i32]) -> Product {
            Product::from_model(row, self.categories.get_many(links))
        }

        fn check_categories(&self, ids: &[i32]) -> Result<(), ServiceError> {
            let missing = self.categories.missing(ids);
            if missing.is_empty() {
                return Ok(());
            }
            Err(ServiceError::Validation(format!("unknown category ids: {missing:?}")))
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryProductRepository {
        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.state().rows.len() as u64)
        }

        async fn find_page(&self, skip: u64, take: u64) -> Result<Vec<Product>, ServiceError> {
            let state = self.state();
            let mut rows: Vec<_> = state.rows.values().cloned().collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(rows
                .into_iter()
                .skip(usize::try_from(skip).unwrap_or(usize::MAX))
                .take(usize::try_from(take).unwrap_or(usize::MAX))
                .map(|r| {
                    let links = state.links.get(&r.id).cloned().unwrap_or_default();
                    self.expand(r, &links)
                })
                .collect())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ServiceError> {
            let state = self.state();
            Ok(state.rows.get(&id).cloned().map(|r| {
                let links = state.links.get(&id).cloned().unwrap_or_default();
                self.expand(r, &links)
            }))
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError> {
            let state = self.state();
            Ok(state.rows.values().find(|r| r.slug == slug).cloned().map(|r| {
                let links = state.links.get(&r.id).cloned().unwrap_or_default();
                self.expand(r, &links)
            }))
        }

        async fn create(&self, input: NewProduct) -> Result<Product, ServiceError> {
            self.check_categories(&input.category_ids)?;
            let mut state = self.state();
            if state.rows.values().any(|r| r.slug == input.slug) {
                return Err(ServiceError::unique("slug"));
            }
            state.next_id += 1;
            let now = Utc::now().into();
            let row = product::Model {
                id: state.next_id,
                name: input.name,
                slug: input.slug,
                description: input.description,
                price: input.price,
                image: input.image,
                created_at: now,
                updated_at: now,
            };
            state.rows.insert(row.id, row.clone());
            state.links.insert(row.id, input.category_ids.clone());
            Ok(self.expand(row, &input.category_ids))
        }

        async fn update(&self, id: i32, changes: ProductChanges) -> Result<Product, ServiceError> {
            if let Some(ids) = &changes.category_ids {
                self.check_categories(ids)?;
            }
            let mut state = self.state();
            let Some(mut row) = state.rows.get(&id).cloned() else {
                return Err(ServiceError::not_found("product"));
            };
            if let Some(slug) = &changes.slug {
                if state.rows.values().any(|r| r.id != id && &r.slug == slug) {
                    return Err(ServiceError::unique("slug"));
                }
            }
            if let Some(v) = changes.name { row.name = v; }
            if let Some(v) = changes.slug { row.slug = v; }
            if let Some(v) = changes.description { row.description = Some(v); }
            if let Some(v) = changes.price { row.price = Some(v); }
            if let Some(v) = changes.image { row.image = Some(v); }
            row.updated_at = Utc::now().into();
            state.rows.insert(id, row.clone());
            if let Some(ids) = changes.category_ids {
                state.links.insert(id, ids);
            }
            let links = state.links.get(&id).cloned().unwrap_or_default();
            Ok(self.expand(row, &links))
        }

        async fn delete(&self, id: i32) -> Result<Product, ServiceError> {
            let mut state = self.state();
            let row = state.rows.remove(&id).ok_or_else(|| ServiceError::not_found("product"))?;
            let links = state.links.remove(&id).unwrap_or_default();
            Ok(self.expand(row, &links))
        }
    }
}
