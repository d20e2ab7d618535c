use std::sync::Arc;

use configs::{AppConfig, PaginationConfig};
use sea_orm::DatabaseConnection;
use service::{
    category::{repo::seaorm::SeaOrmCategoryRepository, CategoryRepository},
    product::{repo::seaorm::SeaOrmProductRepository, service::DynProductService},
    storage::LocalFileStore,
};

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub products: Arc<DynProductService>,
    pub categories: Arc<dyn CategoryRepository>,
    pub pagination: PaginationConfig,
}

impl ServerState {
    pub fn new(
        products: Arc<DynProductService>,
        categories: Arc<dyn CategoryRepository>,
        pagination: PaginationConfig,
    ) -> Self {
        Self { products, categories, pagination }
    }

    /// Database-backed repositories and a local file store under `[uploads]`.
    pub fn with_database(db: DatabaseConnection, cfg: &AppConfig) -> Self {
        let files = Arc::new(LocalFileStore::new(&cfg.uploads.root, &cfg.uploads.subdir));
        let products = DynProductService::new(Arc::new(SeaOrmProductRepository::new(db.clone())), files);
        Self::new(
            Arc::new(products),
            Arc::new(SeaOrmCategoryRepository { db }),
            cfg.pagination,
        )
    }
}
