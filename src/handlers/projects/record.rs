use axum::extract::{Path, State};
use tracing::info;

use super::resolve_customer;
use crate::api::{object_id, ApiJson, ApiResponse, ApiResult};
use crate::database::models::{Project, ProjectView, UpdateProject};
use crate::error::ApiError;
use crate::state::AppState;

fn not_found() -> ApiError {
    ApiError::not_found("Project not found")
}

/// GET /api/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProjectView> {
    let id = object_id(&id, "project")?;
    let project = state
        .repo::<Project>()
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to fetch project"))?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(ProjectView::from(&project)))
}

/// PUT /api/projects/:id
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UpdateProject>,
) -> ApiResult<ProjectView> {
    update(&state, &id, patch)
        .await
        .map_err(|e| e.or_fallback("Failed to update project"))
}

async fn update(state: &AppState, id: &str, mut patch: UpdateProject) -> ApiResult<ProjectView> {
    let id = object_id(id, "project")?;

    if let Some(reference) = patch.customer_ref().map(str::to_string) {
        let customer = resolve_customer(state, &reference).await?;
        patch = patch.with_customer(customer);
    }

    let repo = state.repo::<Project>();
    let mut project = repo.find_by_id(id).await?.ok_or_else(not_found)?;
    let fields = patch.apply(&mut project)?;
    if fields.is_empty() {
        return Ok(ApiResponse::success(ProjectView::from(&project)));
    }

    let updated = repo
        .update_fields(&project, &fields)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(ProjectView::from(&updated)))
}

/// DELETE /api/projects/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProjectView> {
    let id = object_id(&id, "project")?;
    let project = state
        .repo::<Project>()
        .delete_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to delete project"))?
        .ok_or_else(not_found)?;

    info!("Deleted project {} ({})", project.project_number, project.id);
    Ok(ApiResponse::success(ProjectView::from(&project)).with_message("Project deleted successfully"))
}
