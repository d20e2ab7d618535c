use async_trait::async_trait;

use crate::errors::ServiceError;

/// Repository abstraction for categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<models::category::Model>, ServiceError>;
    async fn create(&self, name: &str) -> Result<models::category::Model, ServiceError>;
}

/// In-memory repository for tests and local runs without a database.
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use chrono::Utc;

    #[derive(Default)]
    struct State {
        rows: BTreeMap<i32, models::category::Model>,
        next_id: i32,
    }

    #[derive(Default)]
    pub struct InMemoryCategoryRepository {
        state: Mutex<State>,
    }

    impl InMemoryCategoryRepository {
        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Categories with the given ids; unknown ids are skipped.
        pub fn get_many(&self, ids: &[i32]) -> Vec<models::category::Model> {
            let state = self.state();
            ids.iter().filter_map(|id| state.rows.get(id).cloned()).collect()
        }

        /// Ids from `ids` that do not exist.
        pub fn missing(&self, ids: &[i32]) -> Vec<i32> {
            let state = self.state();
            ids.iter().copied().filter(|id| !state.rows.contains_key(id)).collect()
        }
    }

    #[async_trait]
    impl CategoryRepository for InMemoryCategoryRepository {
        async fn list(&self) -> Result<Vec<models::category::Model>, ServiceError> {
            let mut rows: Vec<_> = self.state().rows.values().cloned().collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(rows)
        }

        async fn create(&self, name: &str) -> Result<models::category::Model, ServiceError> {
            models::category::validate_name(name)?;
            let name = name.trim().to_string();
            let mut state = self.state();
            if state.rows.values().any(|c| c.name == name) {
                return Err(ServiceError::unique("name"));
            }
            state.next_id += 1;
            let row = models::category::Model { id: state.next_id, name, created_at: Utc::now().into() };
            state.rows.insert(row.id, row.clone());
            Ok(row)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn create_assigns_ids_and_rejects_duplicates() {
            let repo = InMemoryCategoryRepository::default();
            let a = repo.create("Mugs").await.unwrap();
            let b = repo.create("Bowls").await.unwrap();
            assert_eq!((a.id, b.id), (1, 2));
            assert!(matches!(repo.create(" Mugs ").await, Err(ServiceError::UniqueConstraint { .. })));
            assert!(matches!(repo.create("  ").await, Err(ServiceError::Validation(_))));

            let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
            assert_eq!(names, vec!["Bowls", "Mugs"]);
            assert_eq!(repo.missing(&[1, 7]), vec![7]);
        }
    }
}
