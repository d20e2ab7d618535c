use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use models::{category, product, product_category};

use crate::errors::ServiceError;
use crate::product::domain::{NewProduct, Product, ProductChanges};
use crate::product::repository::ProductRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// Attach categories to each row, preserving row order.
async fn expand<C: ConnectionTrait>(conn: &C, rows: Vec<product::Model>) -> Result<Vec<Product>, ServiceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let links = product_category::Entity::find()
        .filter(product_category::Column::ProductId.is_in(ids))
        .find_also_related(category::Entity)
        .all(conn)
        .await?;

    let mut by_product: HashMap<i32, Vec<category::Model>> = HashMap::new();
    for (link, cat) in links {
        if let Some(cat) = cat {
            by_product.entry(link.product_id).or_default().push(cat);
        }
    }
    Ok(rows
        .into_iter()
        .map(|r| {
            let cats = by_product.remove(&r.id).unwrap_or_default();
            Product::from_model(r, cats)
        })
        .collect())
}

async fn expand_one<C: ConnectionTrait>(conn: &C, row: product::Model) -> Result<Product, ServiceError> {
    let mut out = expand(conn, vec![row]).await?;
    out.pop().ok_or_else(|| ServiceError::Db("expanded product vanished".into()))
}

async fn ensure_categories_exist<C: ConnectionTrait>(conn: &C, ids: &[i32]) -> Result<(), ServiceError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<i32> = category::Entity::find()
        .filter(category::Column::Id.is_in(ids.to_vec()))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    let missing: Vec<i32> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!("unknown category ids: {missing:?}")))
    }
}

async fn link_categories<C: ConnectionTrait>(conn: &C, product_id: i32, ids: &[i32]) -> Result<(), ServiceError> {
    if ids.is_empty() {
        return Ok(());
    }
    let rows = ids.iter().map(|cid| product_category::ActiveModel {
        product_id: Set(product_id),
        category_id: Set(*cid),
    });
    product_category::Entity::insert_many(rows).exec(conn).await?;
    Ok(())
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(product::Entity::find().count(&self.db).await?)
    }

    async fn find_page(&self, skip: u64, take: u64) -> Result<Vec<Product>, ServiceError> {
        // Postgres binds OFFSET/LIMIT as BIGINT
        if i64::try_from(skip).is_err() || i64::try_from(take).is_err() {
            return Err(ServiceError::Validation(format!("page window {skip}+{take} is out of range")));
        }
        let rows = product::Entity::find()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .offset(skip)
            .limit(take)
            .all(&self.db)
            .await?;
        expand(&self.db, rows).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ServiceError> {
        match product::Entity::find_by_id(id).one(&self.db).await? {
            Some(row) => Ok(Some(expand_one(&self.db, row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError> {
        let found = product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        match found {
            Some(row) => Ok(Some(expand_one(&self.db, row).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, input: NewProduct) -> Result<Product, ServiceError> {
        let txn = self.db.begin().await?;
        ensure_categories_exist(&txn, &input.category_ids).await?;

        let now = Utc::now();
        let row = product::ActiveModel {
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            price: Set(input.price),
            image: Set(input.image),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        link_categories(&txn, row.id, &input.category_ids).await?;

        let created = expand_one(&txn, row).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Product, ServiceError> {
        let txn = self.db.begin().await?;
        let Some(existing) = product::Entity::find_by_id(id).one(&txn).await? else {
            return Err(DbErr::RecordNotFound(format!("product {id}")).into());
        };
        if let Some(ids) = &changes.category_ids {
            ensure_categories_exist(&txn, ids).await?;
        }

        let mut am: product::ActiveModel = existing.into();
        if let Some(v) = changes.name { am.name = Set(v); }
        if let Some(v) = changes.slug { am.slug = Set(v); }
        if let Some(v) = changes.description { am.description = Set(Some(v)); }
        if let Some(v) = changes.price { am.price = Set(Some(v)); }
        if let Some(v) = changes.image { am.image = Set(Some(v)); }
        am.updated_at = Set(Utc::now().into());
        let row = am.update(&txn).await?;

        if let Some(ids) = changes.category_ids {
            product_category::Entity::delete_many()
                .filter(product_category::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            link_categories(&txn, id, &ids).await?;
        }

        let updated = expand_one(&txn, row).await?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<Product, ServiceError> {
        let txn = self.db.begin().await?;
        let Some(existing) = product::Entity::find_by_id(id).one(&txn).await? else {
            return Err(DbErr::RecordNotFound(format!("product {id}")).into());
        };
        let removed = expand_one(&txn, existing).await?;

        product_category::Entity::delete_many()
            .filter(product_category::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        let res = product::Entity::delete_by_id(id).exec(&txn).await?;
        if res.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("product {id}")).into());
        }
        txn.commit().await?;
        Ok(removed)
    }
}
