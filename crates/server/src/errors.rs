use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Error response of the JSON API: `{error, message, fields?}`.
///
/// A 404 is sent without a body.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
    pub fields: Option<Vec<String>>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail, fields: None }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(detail.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NOT_FOUND {
            return StatusCode::NOT_FOUND.into_response();
        }
        let mut body = json!({ "error": self.title, "message": self.detail });
        if let Some(fields) = self.fields {
            body["fields"] = json!(fields);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::UniqueConstraint { ref fields } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                title: "Unique Constraint Violation",
                fields: Some(fields.clone()),
                detail: Some(e.to_string()),
            },
            ServiceError::Db(_) | ServiceError::Storage(_) => {
                error!(error = %e, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
            }
        }
    }
}

impl JsonApiError {
    /// Keep the status an extractor chose, but answer in the JSON error shape.
    fn rejected(status: StatusCode, detail: String) -> Self {
        let title = match status {
            StatusCode::PAYLOAD_TOO_LARGE => "Payload Too Large",
            StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported Media Type",
            StatusCode::UNPROCESSABLE_ENTITY => "Unprocessable Entity",
            s if s.is_server_error() => "Internal Server Error",
            _ => "Bad Request",
        };
        Self::new(status, title, Some(detail))
    }
}

impl From<MultipartError> for JsonApiError {
    fn from(e: MultipartError) -> Self { Self::rejected(e.status(), e.body_text()) }
}

impl From<MultipartRejection> for JsonApiError {
    fn from(e: MultipartRejection) -> Self { Self::rejected(e.status(), e.body_text()) }
}

impl From<QueryRejection> for JsonApiError {
    fn from(e: QueryRejection) -> Self { Self::rejected(e.status(), e.body_text()) }
}

impl From<PathRejection> for JsonApiError {
    fn from(e: PathRejection) -> Self { Self::rejected(e.status(), e.body_text()) }
}

impl From<JsonRejection> for JsonApiError {
    fn from(e: JsonRejection) -> Self { Self::rejected(e.status(), e.body_text()) }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
