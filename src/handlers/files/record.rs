use axum::extract::{Path, State};
use tracing::info;

use crate::api::{object_id, ApiJson, ApiResponse, ApiResult};
use crate::database::models::{FileRecord, FileView, UpdateFile};
use crate::error::ApiError;
use crate::state::AppState;

fn not_found() -> ApiError {
    ApiError::not_found("File not found")
}

/// GET /api/files/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<FileView> {
    let id = object_id(&id, "file")?;
    let file = state
        .repo::<FileRecord>()
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to fetch file"))?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(FileView::from(&file)))
}

/// PUT /api/files/:id - Only name, description, category and associations change
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UpdateFile>,
) -> ApiResult<FileView> {
    update(&state, &id, patch)
        .await
        .map_err(|e| e.or_fallback("Failed to update file"))
}

async fn update(state: &AppState, id: &str, patch: UpdateFile) -> ApiResult<FileView> {
    let id = object_id(id, "file")?;
    let repo = state.repo::<FileRecord>();

    let mut file = repo.find_by_id(id).await?.ok_or_else(not_found)?;
    let fields = patch.apply(&mut file)?;
    if fields.is_empty() {
        return Ok(ApiResponse::success(FileView::from(&file)));
    }

    let updated = repo
        .update_fields(&file, &fields)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(FileView::from(&updated)))
}

/// DELETE /api/files/:id - Removes the metadata record only
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<FileView> {
    let id = object_id(&id, "file")?;
    let file = state
        .repo::<FileRecord>()
        .delete_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to delete file"))?
        .ok_or_else(not_found)?;

    info!("Deleted file record {}", file.id);
    Ok(ApiResponse::success(FileView::from(&file)).with_message("File deleted successfully"))
}
