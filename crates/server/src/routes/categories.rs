use axum::{extract::{rejection::JsonRejection, State}, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
}

/// All categories ordered by name
#[utoipa::path(get, path = "/categories", responses((status = 200, description = "all categories", body = [crate::openapi::CategoryDoc])), tag = "categories")]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<models::category::Model>>, JsonApiError> {
    let rows = state.categories.list().await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = crate::openapi::CreateCategoryDoc,
    responses(
        (status = 201, description = "created", body = crate::openapi::CategoryDoc),
        (status = 400, description = "blank name or malformed body", body = crate::openapi::ErrorDoc),
        (status = 422, description = "name already taken", body = crate::openapi::ErrorDoc),
    ),
    tag = "categories"
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<CreateCategoryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<models::category::Model>), JsonApiError> {
    let Json(input) = body?;
    let created = state.categories.create(&input.name).await?;
    info!(id = created.id, name = %created.name, "category_created");
    Ok((StatusCode::CREATED, Json(created)))
}
