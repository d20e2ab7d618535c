use serde::Serialize;

use models::{category, product};

/// Category as embedded in a product response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
}

impl From<category::Model> for CategoryRef {
    fn from(c: category::Model) -> Self { Self { id: c.id, name: c.name } }
}

/// Product with its categories expanded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub categories: Vec<CategoryRef>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl Product {
    pub fn from_model(m: product::Model, categories: Vec<category::Model>) -> Self {
        let mut categories: Vec<CategoryRef> = categories.into_iter().map(CategoryRef::from).collect();
        categories.sort_by_key(|c| c.id);
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            price: m.price,
            image: m.image,
            categories,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Product fields supplied on create (slug and id are never client-set).
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Partial product fields supplied on update.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Row to insert, as handed to the repository.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub category_ids: Vec<i32>,
}

/// Column changes, as handed to the repository. `None` leaves a column as is.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    /// When present, replaces the whole set of category links.
    pub category_ids: Option<Vec<i32>>,
}

/// How `GET /products/:idOrSlug` resolves its path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductKey {
    Id(i32),
    /// Numeric, but cannot be any product id (fractional or out of range).
    Unmatchable,
    Slug(String),
}

impl ProductKey {
    /// A segment that parses entirely as a finite number is an id lookup;
    /// anything else is a slug.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => {
                if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 {
                    ProductKey::Id(n as i32)
                } else {
                    ProductKey::Unmatchable
                }
            }
            _ => ProductKey::Slug(raw.to_string()),
        }
    }
}

/// Deduplicate while keeping first-seen order.
pub fn dedup_ids(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
