use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{category, errors, product_category, slug};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ProductCategory,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ProductCategory => Entity::has_many(product_category::Entity).into(),
        }
    }
}

impl Related<product_category::Entity> for Entity {
    fn to() -> RelationDef { Relation::ProductCategory.def() }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { product_category::Relation::Category.def() }
    fn via() -> Option<RelationDef> { Some(product_category::Relation::Product.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

/// Check `name` and return the slug it derives.
pub fn slug_for_name(name: &str) -> Result<String, errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    let s = slug::slugify(name);
    if s.is_empty() {
        return Err(errors::ModelError::Validation(
            "name must contain at least one letter or digit".into(),
        ));
    }
    Ok(s)
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}
