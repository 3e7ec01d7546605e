use axum::extract::{FromRequest, FromRequestParts};
use bson::oid::ObjectId;

use crate::error::ApiError;

/// `axum::Json` with rejections reported in the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with rejections reported in the API error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Parse a path id, rejecting anything that is not a 24-character hex object id.
pub fn object_id(raw: &str, entity: &'static str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::InvalidId(entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_accepts_only_hex() {
        assert!(object_id("65a1b2c3d4e5f60718293a4b", "task").is_ok());
        assert_eq!(object_id("not-an-id", "task"), Err(ApiError::InvalidId("task")));
        assert_eq!(object_id("65a1b2c3d4e5f60718293a4", "task"), Err(ApiError::InvalidId("task")));
    }
}
