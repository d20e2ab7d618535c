use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CategoryDoc { pub id: i32, pub name: String, pub created_at: String }

#[derive(ToSchema)]
pub struct CreateCategoryDoc { pub name: String }

#[derive(ToSchema)]
pub struct CategoryRefDoc { pub id: i32, pub name: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductDoc {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    /// Stored path of the image, served under `/uploads`
    pub image: Option<String>,
    pub categories: Vec<CategoryRefDoc>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PageMetaDoc {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
}

#[derive(ToSchema)]
pub struct ProductPageDoc { pub items: Vec<ProductDoc>, pub meta: PageMetaDoc }

/// Multipart form of `POST /products`
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductFormDoc {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    /// Repeated field, `1,2` or `[1,2]`
    pub category_ids: Option<Vec<i32>>,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Multipart form of `PATCH /products/{id}`; absent fields are left unchanged
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductPatchDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_ids: Option<Vec<i32>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub message: Option<String>,
    /// Conflicting fields of a unique constraint violation
    pub fields: Option<Vec<String>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::categories::list,
        crate::routes::categories::create,
    ),
    components(
        schemas(
            HealthResponse,
            CategoryDoc,
            CreateCategoryDoc,
            CategoryRefDoc,
            ProductDoc,
            PageMetaDoc,
            ProductPageDoc,
            ProductFormDoc,
            ProductPatchDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products"),
        (name = "categories")
    )
)]
pub struct ApiDoc;
