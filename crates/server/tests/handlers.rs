//! Handler tests for the catalog API
//!
//! Drive the full router in-process against in-memory repositories and a
//! temporary upload directory:
//! - multipart parsing and field coercion
//! - status codes and error bodies
//! - image files written, replaced and removed

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot()
use tower_http::cors::CorsLayer;

use configs::{PaginationConfig, UploadsConfig};
use server::{routes, state::ServerState};
use service::category::repository::{memory::InMemoryCategoryRepository, CategoryRepository};
use service::product::{repository::memory::InMemoryProductRepository, service::DynProductService};
use service::storage::LocalFileStore;

const BOUNDARY: &str = "catalog-test-boundary";

struct TestApp {
    router: Router,
    uploads_root: PathBuf,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    fn image_exists(&self, product: &Value) -> bool {
        product["image"].as_str().map(|p| self.uploads_root.join(p).exists()).unwrap_or(false)
    }
}

async fn app_with_limit(max_file_bytes: usize) -> TestApp {
    let tmp = tempfile::tempdir().unwrap();
    let uploads = UploadsConfig {
        root: tmp.path().join("uploads").to_string_lossy().into_owned(),
        subdir: "products".into(),
        max_file_bytes,
    };

    let categories = Arc::new(InMemoryCategoryRepository::default());
    categories.create("Mugs").await.unwrap();
    categories.create("Kitchen").await.unwrap();

    let repo = Arc::new(InMemoryProductRepository::new(categories.clone()));
    let files = Arc::new(LocalFileStore::new(&uploads.root, &uploads.subdir));
    let products = DynProductService::new(repo, files);
    let state = ServerState::new(Arc::new(products), categories, PaginationConfig::default());

    TestApp {
        router: routes::build_router(state, CorsLayer::very_permissive(), &uploads),
        uploads_root: PathBuf::from(&uploads.root),
        _tmp: tmp,
    }
}

async fn app() -> TestApp {
    app_with_limit(1024 * 1024).await
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(method: &str, uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn create_mug(app: &TestApp, name: &str) -> Value {
    let req = multipart(
        "POST",
        "/products",
        &[Part::Text("name", name), Part::Text("categoryIds", "1,2"), Part::File("image", "mug.png", b"png-bytes")],
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn health_is_ok() {
    let app = app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn create_returns_201_with_slug_and_categories() {
    let app = app().await;
    let body = create_mug(&app, "Red Mug").await;
    assert_eq!(body["slug"], "red-mug");
    assert_eq!(body["categories"], json!([{"id": 1, "name": "Mugs"}, {"id": 2, "name": "Kitchen"}]));
    assert!(body["createdAt"].is_string());
    let image = body["image"].as_str().unwrap();
    assert!(image.starts_with("products/") && image.ends_with(".png"));
    assert!(!Path::new(image).is_absolute());
    assert!(app.image_exists(&body));
}

#[tokio::test]
async fn get_by_id_and_by_slug_agree() {
    let app = app().await;
    let created = create_mug(&app, "Red Mug").await;

    let (s1, by_id) = send(&app, get(&format!("/products/{}", created["id"]))).await;
    let (s2, by_slug) = send(&app, get("/products/red-mug")).await;
    assert_eq!((s1, s2), (StatusCode::OK, StatusCode::OK));
    assert_eq!(by_id, by_slug);

    let (status, body) = send(&app, get("/products/2.5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn duplicate_slug_is_422_with_fields() {
    let app = app().await;
    create_mug(&app, "Red Mug").await;
    let req = multipart("POST", "/products", &[Part::Text("name", "RED mug"), Part::File("image", "b.png", b"b")]);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"], json!(["slug"]));
}

#[tokio::test]
async fn create_without_image_is_400() {
    let app = app().await;
    let req = multipart("POST", "/products", &[Part::Text("name", "Bare")]);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "image is required");
}

#[tokio::test]
async fn malformed_category_ids_are_400() {
    let app = app().await;
    let req = multipart(
        "POST",
        "/products",
        &[Part::Text("name", "Cup"), Part::Text("categoryIds", "one"), Part::File("image", "c.png", b"c")],
    );
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_category_is_400() {
    let app = app().await;
    let req = multipart(
        "POST",
        "/products",
        &[Part::Text("name", "Cup"), Part::Text("categoryIds", "[9]"), Part::File("image", "c.png", b"c")],
    );
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_renames_and_replaces_image() {
    let app = app().await;
    let created = create_mug(&app, "Red Mug").await;
    let uri = format!("/products/{}", created["id"]);

    let req = multipart(
        "PATCH",
        &uri,
        &[Part::Text("name", "Blue Mug"), Part::Text("categoryIds", "2"), Part::File("image", "blue.jpg", b"f2")],
    );
    let (status, updated) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["slug"], "blue-mug");
    assert_eq!(updated["categories"], json!([{"id": 2, "name": "Kitchen"}]));
    assert!(updated["image"].as_str().unwrap().ends_with(".jpg"));
    assert!(app.image_exists(&updated));
    assert!(!app.image_exists(&created));

    // no name, no image: slug and image kept
    let req = multipart("PATCH", &uri, &[Part::Text("description", "glazed")]);
    let (status, again) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["slug"], "blue-mug");
    assert_eq!(again["image"], updated["image"]);
    assert_eq!(again["description"], "glazed");
}

#[tokio::test]
async fn update_missing_is_404() {
    let app = app().await;
    let req = multipart("PATCH", "/products/77", &[Part::Text("name", "Nothing")]);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn delete_removes_record_and_image() {
    let app = app().await;
    let created = create_mug(&app, "Red Mug").await;
    let uri = format!("/products/{}", created["id"]);

    let (status, body) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert!(!app.image_exists(&created));

    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_paginates_with_meta() {
    let app = app().await;
    for name in ["a", "b", "c"] {
        create_mug(&app, name).await;
    }

    let (status, body) = send(&app, get("/products?page=1&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"], json!({"page": 1, "limit": 2, "totalCount": 3, "nextPage": 2}));

    let (_, body) = send(&app, get("/products?page=2&limit=2")).await;
    assert_eq!(body["meta"], json!({"page": 2, "limit": 2, "totalCount": 3, "previousPage": 1}));

    let (_, body) = send(&app, get("/products?page=0&limit=1000")).await;
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], 100);

    let (status, body) = send(&app, get("/products?page=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn huge_page_is_an_empty_page() {
    let app = app().await;
    create_mug(&app, "Red Mug").await;

    let (status, body) = send(&app, get("/products?page=100000000000000000&limit=100")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["meta"]["totalCount"], 1);
    assert!(body["meta"].get("nextPage").is_none());
    assert!(body["meta"]["previousPage"].is_u64());
}

#[tokio::test]
async fn non_numeric_id_is_a_json_400() {
    let app = app().await;
    let (status, body) = send(&app, delete("/products/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let req = multipart("PATCH", "/products/abc", &[Part::Text("name", "Nope")]);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn non_multipart_create_is_a_json_400() {
    let app = app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Cup"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn stored_image_is_served_under_uploads() {
    let app = app().await;
    let created = create_mug(&app, "Red Mug").await;
    let uri = format!("/uploads/{}", created["image"].as_str().unwrap());

    let response = app.router.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"png-bytes");
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let app = app_with_limit(16).await;
    let big = vec![7u8; 200 * 1024];
    let req = multipart("POST", "/products", &[Part::Text("name", "Huge"), Part::File("image", "h.png", &big)]);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn categories_list_and_duplicate() {
    let app = app().await;
    let (status, body) = send(&app, get("/categories")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Kitchen", "Mugs"]);

    let req = Request::builder()
        .method("POST")
        .uri("/categories")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Mugs"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"], json!(["name"]));

    let req = Request::builder()
        .method("POST")
        .uri("/categories")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app().await;
    let (status, body) = send(&app, get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/products"].is_object());
}
