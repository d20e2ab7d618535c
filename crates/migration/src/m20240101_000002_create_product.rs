//! Create `product` table.
//! `slug` is derived from `name` by the application; uniqueness is enforced
//! by `idx_product_slug` in the index migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(pk_auto(Product::Id))
                    .col(string_len(Product::Name, 256).not_null())
                    .col(string_len(Product::Slug, 256).not_null())
                    .col(text_null(Product::Description))
                    .col(double_null(Product::Price))
                    .col(string_len_null(Product::Image, 512))
                    .col(
                        timestamp_with_time_zone(Product::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Product::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Price,
    Image,
    CreatedAt,
    UpdatedAt,
}
