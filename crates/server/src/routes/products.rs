use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use service::{
    pagination::{Page, Pagination},
    product::{
        domain::{ProductForm, ProductPatch},
        Product,
    },
    storage::Upload,
};

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page, default 1
    pub page: Option<u64>,
    /// Page size, default 10, capped by the configured maximum
    pub limit: Option<u64>,
}

/// Fields of a product multipart form. Every field is optional here; the
/// handlers decide which ones are required.
#[derive(Debug, Default)]
pub struct ProductMultipart {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_ids: Option<Vec<i32>>,
    pub image: Option<Upload>,
}

/// Parse one `categoryIds` value: `3`, `1,2` or `[1,2]`.
pub fn parse_category_ids(raw: &str) -> Result<Vec<i32>, JsonApiError> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        return serde_json::from_str::<Vec<i32>>(raw)
            .map_err(|e| JsonApiError::bad_request(format!("categoryIds: {e}")));
    }
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| JsonApiError::bad_request(format!("categoryIds: {s:?} is not an integer id")))
        })
        .collect()
}

fn parse_price(raw: &str) -> Result<Option<f64>, JsonApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| JsonApiError::bad_request(format!("price: {raw:?} is not a number")))
}

async fn read_form(mut multipart: Multipart) -> Result<ProductMultipart, JsonApiError> {
    let mut form = ProductMultipart::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else { continue };
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                // an empty file input means "no new image"
                if bytes.is_empty() {
                    continue;
                }
                let mut upload = Upload::new(file_name, bytes);
                upload.content_type = content_type;
                form.image = Some(upload);
            }
            "name" => form.name = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            "price" => form.price = parse_price(&field.text().await?)?,
            "categoryIds" | "categoryIds[]" => {
                let ids = parse_category_ids(&field.text().await?)?;
                form.category_ids.get_or_insert_with(Vec::new).extend(ids);
            }
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }
    Ok(form)
}

/// Paginated product listing, newest first
#[utoipa::path(
    get,
    path = "/products",
    params(ListQuery),
    responses((status = 200, description = "one page of products", body = crate::openapi::ProductPageDoc), (status = 400, description = "non-numeric page or limit", body = crate::openapi::ErrorDoc)),
    tag = "products"
)]
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Page<Product>>, JsonApiError> {
    let Query(q) = query?;
    let cfg = state.pagination;
    let p = Pagination::from_query(q.page, q.limit, cfg.default_limit, cfg.max_limit);
    let page = state.products.list(p).await?;
    Ok(Json(page))
}

/// Single product by numeric id or by slug
#[utoipa::path(
    get,
    path = "/products/{idOrSlug}",
    params(("idOrSlug" = String, Path, description = "numeric id or slug")),
    responses((status = 200, description = "the product", body = crate::openapi::ProductDoc), (status = 404, description = "no such product")),
    tag = "products"
)]
pub async fn get(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Product>, JsonApiError> {
    let Path(id_or_slug) = path?;
    let product = state.products.get(&id_or_slug).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body(content = crate::openapi::ProductFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "created", body = crate::openapi::ProductDoc),
        (status = 400, description = "missing name or image, malformed form", body = crate::openapi::ErrorDoc),
        (status = 413, description = "image too large"),
        (status = 422, description = "slug already taken", body = crate::openapi::ErrorDoc),
    ),
    tag = "products"
)]
pub async fn create(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Product>), JsonApiError> {
    let form = read_form(multipart?).await?;
    let name = form.name.ok_or_else(|| JsonApiError::bad_request("name is required"))?;
    let image = form.image.ok_or_else(|| JsonApiError::bad_request("image is required"))?;
    let input = ProductForm { name, description: form.description, price: form.price };
    let created = state
        .products
        .create(input, form.category_ids.unwrap_or_default(), image)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "numeric product id")),
    request_body(content = crate::openapi::ProductPatchDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "the product", body = crate::openapi::ProductDoc),
        (status = 400, description = "non-numeric id or malformed form", body = crate::openapi::ErrorDoc),
        (status = 404, description = "no such product"),
        (status = 422, description = "slug already taken", body = crate::openapi::ErrorDoc),
    ),
    tag = "products"
)]
pub async fn update(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>, JsonApiError> {
    let Path(id) = path?;
    let form = read_form(multipart?).await?;
    let patch = ProductPatch { name: form.name, description: form.description, price: form.price };
    let updated = state.products.update(id, patch, form.category_ids, form.image).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "numeric product id")),
    responses(
        (status = 204, description = "deleted"),
        (status = 400, description = "non-numeric id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "no such product"),
    ),
    tag = "products"
)]
pub async fn delete(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
