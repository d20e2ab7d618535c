use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use configs::UploadsConfig;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod categories;
pub mod products;

/// Headroom for the text fields and multipart framing around the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Liveness check
#[utoipa::path(get, path = "/health", responses((status = 200, description = "service is up", body = crate::openapi::HealthResponse)), tag = "health")]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: product and category APIs, the
/// OpenAPI document and the uploaded files.
pub fn build_router(state: ServerState, cors: CorsLayer, uploads: &UploadsConfig) -> Router {
    let body_limit = DefaultBodyLimit::max(uploads.max_file_bytes.saturating_add(FORM_OVERHEAD_BYTES));

    let products = Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id_or_slug",
            get(products::get).patch(products::update).delete(products::delete),
        )
        .layer(body_limit);

    let categories = Router::new()
        .route("/categories", get(categories::list).post(categories::create));

    let public = Router::new()
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_json))
        .nest_service("/uploads", ServeDir::new(&uploads.root));

    // Compose
    public
        .merge(products)
        .merge(categories)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
