use axum::extract::{Path, State};
use tracing::info;

use crate::api::{object_id, ApiJson, ApiResponse, ApiResult};
use crate::database::models::{Task, TaskView, UpdateTask};
use crate::error::ApiError;
use crate::state::AppState;

fn not_found() -> ApiError {
    ApiError::not_found("Task not found")
}

/// GET /api/tasks/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<TaskView> {
    let id = object_id(&id, "task")?;
    let task = state
        .repo::<Task>()
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to fetch task"))?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(TaskView::from(&task)))
}

/// PUT /api/tasks/:id - A falsy `dueDate` clears the date
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UpdateTask>,
) -> ApiResult<TaskView> {
    update(&state, &id, patch)
        .await
        .map_err(|e| e.or_fallback("Failed to update task"))
}

async fn update(state: &AppState, id: &str, patch: UpdateTask) -> ApiResult<TaskView> {
    let id = object_id(id, "task")?;
    let repo = state.repo::<Task>();

    let mut task = repo.find_by_id(id).await?.ok_or_else(not_found)?;
    let fields = patch.apply(&mut task)?;
    if fields.is_empty() {
        return Ok(ApiResponse::success(TaskView::from(&task)));
    }

    let updated = repo
        .update_fields(&task, &fields)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(TaskView::from(&updated)))
}

/// DELETE /api/tasks/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<TaskView> {
    let id = object_id(&id, "task")?;
    let task = state
        .repo::<Task>()
        .delete_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to delete task"))?
        .ok_or_else(not_found)?;

    info!("Deleted task {}", task.id);
    Ok(ApiResponse::success(TaskView::from(&task)).with_message("Task deleted successfully"))
}
