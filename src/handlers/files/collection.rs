use axum::extract::State;
use tracing::info;

use crate::api::{ApiJson, ApiQuery, ApiResponse, ApiResult, ListQuery, ListSpec, Pagination};
use crate::database::models::{CreateFile, FileRecord, FileView};
use crate::state::AppState;

const LIST: ListSpec = ListSpec {
    search_columns: &["name", "fileName", "description"],
    sort_by: "createdAt",
    sort_order: "desc",
    limit: 100,
};

/// GET /api/files - Search and filter by category, project or customer
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<FileView>> {
    list(&state, &query)
        .await
        .map_err(|e| e.or_fallback("Failed to fetch files"))
}

async fn list(state: &AppState, query: &ListQuery) -> ApiResult<Vec<FileView>> {
    let listing = query.listing(&LIST, state.config.filter.max_limit)?;
    let filter = listing
        .filter
        .equals("category", query.category.as_deref())
        .equals("projectId", query.project_id.as_deref())
        .equals("customerId", query.customer_id.as_deref())
        .build();
    let page = state.repo::<FileRecord>().select_page(&filter).await?;

    let data = page.items.iter().map(FileView::from).collect();
    Ok(ApiResponse::paginated(
        data,
        Pagination::new(listing.page, listing.limit, page.total),
    ))
}

/// POST /api/files - Record metadata for an uploaded file
pub async fn post(State(state): State<AppState>, ApiJson(input): ApiJson<CreateFile>) -> ApiResult<FileView> {
    create(&state, input)
        .await
        .map_err(|e| e.or_fallback("Failed to create file"))
}

async fn create(state: &AppState, input: CreateFile) -> ApiResult<FileView> {
    let file = input.into_file()?;
    state.repo::<FileRecord>().create(&file).await?;
    info!("Created file record {} for {}", file.id, file.file_url);
    Ok(ApiResponse::created(FileView::from(&file)))
}
