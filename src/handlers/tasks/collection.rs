use axum::extract::State;
use tracing::info;

use crate::api::{ApiJson, ApiQuery, ApiResponse, ApiResult, ListQuery, ListSpec, Pagination};
use crate::database::models::{CreateTask, Task, TaskView};
use crate::state::AppState;

const LIST: ListSpec = ListSpec {
    search_columns: &["title", "description"],
    sort_by: "createdAt",
    sort_order: "desc",
    limit: 10,
};

/// GET /api/tasks - Filter by status and priority
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<TaskView>> {
    list(&state, &query)
        .await
        .map_err(|e| e.or_fallback("Failed to fetch tasks"))
}

async fn list(state: &AppState, query: &ListQuery) -> ApiResult<Vec<TaskView>> {
    let listing = query.listing(&LIST, state.config.filter.max_limit)?;
    let filter = listing
        .filter
        .equals("status", query.status.as_deref())
        .equals("priority", query.priority.as_deref())
        .build();
    let page = state.repo::<Task>().select_page(&filter).await?;

    let data = page.items.iter().map(TaskView::from).collect();
    Ok(ApiResponse::paginated(
        data,
        Pagination::new(listing.page, listing.limit, page.total),
    ))
}

/// POST /api/tasks
pub async fn post(State(state): State<AppState>, ApiJson(input): ApiJson<CreateTask>) -> ApiResult<TaskView> {
    create(&state, input)
        .await
        .map_err(|e| e.or_fallback("Failed to create task"))
}

async fn create(state: &AppState, input: CreateTask) -> ApiResult<TaskView> {
    let task = input.into_task()?;
    state.repo::<Task>().create(&task).await?;
    info!("Created task {}", task.id);
    Ok(ApiResponse::created(TaskView::from(&task)))
}
