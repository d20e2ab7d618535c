use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Product: slug is the alternate lookup key and must be unique
        manager
            .create_index(
                Index::create()
                    .name("idx_product_slug")
                    .table(Product::Table)
                    .col(Product::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Product: default listing order is newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_product_created_at")
                    .table(Product::Table)
                    .col(Product::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Category: names are unique
        manager
            .create_index(
                Index::create()
                    .name("idx_category_name")
                    .table(Category::Table)
                    .col(Category::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ProductCategory: reverse lookup by category
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category_category")
                    .table(ProductCategory::Table)
                    .col(ProductCategory::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_product_slug").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_created_at").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_category_name").table(Category::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_product_category_category")
                    .table(ProductCategory::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Product { Table, Slug, CreatedAt }

#[derive(DeriveIden)]
enum Category { Table, Name }

#[derive(DeriveIden)]
enum ProductCategory { Table, CategoryId }
