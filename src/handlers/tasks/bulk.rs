use axum::extract::State;
use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiJson, ApiResponse, ApiResult};
use crate::database::models::validation::parse_enum;
use crate::database::models::Task;
use crate::database::UpdateDoc;
use crate::error::ApiError;
use crate::filter::Condition;
use crate::state::AppState;
use crate::types::{BulkOperation, TaskPriority, TaskStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_data: Option<BulkUpdateData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// POST /api/tasks/bulk - Delete or re-status many tasks at once
pub async fn post(State(state): State<AppState>, ApiJson(request): ApiJson<BulkRequest>) -> ApiResult<()> {
    run(&state, request)
        .await
        .map_err(|e| e.or_fallback("Failed to perform bulk operation"))
}

async fn run(state: &AppState, request: BulkRequest) -> ApiResult<()> {
    let operation = present(request.operation.as_ref());
    let task_ids = request.task_ids.unwrap_or_default();
    let operation = match operation {
        Some(operation) if !task_ids.is_empty() => operation,
        _ => return Err(ApiError::bad_request("Operation and taskIds array are required")),
    };
    let kind = BulkOperation::parse(operation).ok_or_else(|| {
        ApiError::bad_request("Invalid operation. Supported: delete, updateStatus, updatePriority")
    })?;

    let ids = task_ids
        .iter()
        .map(|raw| {
            ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid task ID: {}", raw)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let selection = Condition::in_list("_id", ids);
    let repo = state.repo::<Task>();
    let update_data = request.update_data.unwrap_or_default();

    let update = match kind {
        BulkOperation::Delete => {
            let deleted = repo.delete_many(&selection).await?;
            info!("Bulk deleted {} task(s)", deleted);
            return Ok(ApiResponse::empty()
                .with_message(format!("{} task(s) deleted successfully", deleted))
                .with_field("deletedCount", deleted));
        }
        BulkOperation::UpdateStatus => {
            let status = present(update_data.status.as_ref())
                .ok_or_else(|| ApiError::bad_request("Status is required for updateStatus operation"))?;
            let status: TaskStatus = parse_enum(status, "status")?;
            UpdateDoc::new().set("status", status.as_str())
        }
        BulkOperation::UpdatePriority => {
            let priority = present(update_data.priority.as_ref())
                .ok_or_else(|| ApiError::bad_request("Priority is required for updatePriority operation"))?;
            let priority: TaskPriority = parse_enum(priority, "priority")?;
            UpdateDoc::new().set("priority", priority.as_str())
        }
    };

    let summary = repo
        .update_many(&selection, &update.set("updatedAt", DateTime::now()))
        .await?;
    info!(
        "Bulk {} matched {} task(s), modified {}",
        operation, summary.matched_count, summary.modified_count
    );
    Ok(ApiResponse::empty()
        .with_message(format!("{} task(s) updated successfully", summary.modified_count))
        .with_field("modifiedCount", summary.modified_count))
}
