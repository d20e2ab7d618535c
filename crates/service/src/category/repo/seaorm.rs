use sea_orm::DatabaseConnection;

use crate::category::repository::CategoryRepository;
use crate::errors::ServiceError;

pub struct SeaOrmCategoryRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn list(&self) -> Result<Vec<models::category::Model>, ServiceError> {
        Ok(models::category::list(&self.db).await?)
    }

    async fn create(&self, name: &str) -> Result<models::category::Model, ServiceError> {
        Ok(models::category::create(&self.db, name).await?)
    }
}
