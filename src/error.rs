// HTTP API Error Types
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{Map, Value};

use crate::database::models::InvalidDocument;
use crate::database::StoreError;
use crate::filter::FilterError;

/// HTTP API error with the status code and message the client sees
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    /// Path id is not a 24-character hex object id. Holds the entity name.
    InvalidId(&'static str),
    Validation(String),
    /// Uniqueness violation, reported as 400 like any other bad input.
    Conflict(String),
    BadRequest(String),
    /// 400 with extra top-level fields next to `error`.
    Rejected { message: String, details: Map<String, Value> },

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_)
            | ApiError::Validation(_)
            | ApiError::Conflict(_)
            | ApiError::BadRequest(_)
            | ApiError::Rejected { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-facing message
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidId(entity) => format!("Invalid {} ID", entity),
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
            ApiError::Rejected { message, .. } => message.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(self.message()));
        if let ApiError::Rejected { details, .. } = self {
            for (key, value) in details {
                body.insert(key.clone(), value.clone());
            }
        }
        Value::Object(body)
    }

    /// Use `fallback` when an internal error carries no message.
    pub fn or_fallback(self, fallback: &str) -> Self {
        match self {
            ApiError::Internal(msg) if msg.trim().is_empty() => ApiError::Internal(fallback.to_string()),
            other => other,
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn rejected(message: impl Into<String>, details: Value) -> Self {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        ApiError::Rejected { message: message.into(), details }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{} {}", status.as_u16(), self.message());
        }
        (status, Json(self.to_json())).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<InvalidDocument> for ApiError {
    fn from(err: InvalidDocument) -> Self {
        ApiError::Validation(err.0)
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_id_message_names_the_entity() {
        let err = ApiError::InvalidId("customer");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json(), json!({ "success": false, "error": "Invalid customer ID" }));
    }

    #[test]
    fn rejected_merges_details() {
        let err = ApiError::rejected("Database already contains 3 projects.", json!({ "existingCount": 3 }));
        assert_eq!(
            err.to_json(),
            json!({ "success": false, "error": "Database already contains 3 projects.", "existingCount": 3 })
        );
    }

    #[test]
    fn fallback_only_fills_empty_internal_messages() {
        assert_eq!(
            ApiError::internal("").or_fallback("Failed to fetch customers"),
            ApiError::internal("Failed to fetch customers")
        );
        assert_eq!(
            ApiError::internal("connection reset").or_fallback("Failed to fetch customers"),
            ApiError::internal("connection reset")
        );
        assert_eq!(
            ApiError::not_found("Task not found").or_fallback("x"),
            ApiError::not_found("Task not found")
        );
    }

    #[test]
    fn store_errors_map_to_status() {
        let dup = StoreError::DuplicateKey { collection: "customers".into(), message: "email".into() };
        assert_eq!(ApiError::from(dup).status_code(), StatusCode::BAD_REQUEST);
        let backend = StoreError::Backend("down".into());
        assert_eq!(ApiError::from(backend), ApiError::internal("down"));
    }
}
