use axum::extract::State;
use chrono::Utc;
use tracing::{info, warn};

use super::resolve_customer;
use crate::api::{ApiJson, ApiQuery, ApiResponse, ApiResult, ListQuery, ListSpec, Pagination};
use crate::database::models::project::project_number;
use crate::database::models::{CreateProject, Project, ProjectView};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::Condition;
use crate::state::AppState;

const LIST: ListSpec = ListSpec {
    search_columns: &["name", "customer", "location"],
    sort_by: "created",
    sort_order: "desc",
    limit: 100,
};

/// GET /api/projects - Filter by customer, location and projectType
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<ProjectView>> {
    list(&state, &query)
        .await
        .map_err(|e| e.or_fallback("Failed to fetch projects"))
}

async fn list(state: &AppState, query: &ListQuery) -> ApiResult<Vec<ProjectView>> {
    let listing = query.listing(&LIST, state.config.filter.max_limit)?;
    let filter = listing
        .filter
        .equals("customer", query.customer.as_deref())
        .equals("location", query.location.as_deref())
        .equals("projectType", query.project_type.as_deref())
        .build();
    let page = state.repo::<Project>().select_page(&filter).await?;

    let data = page.items.iter().map(ProjectView::from).collect();
    Ok(ApiResponse::paginated(
        data,
        Pagination::new(listing.page, listing.limit, page.total),
    ))
}

/// POST /api/projects - Create a project with a generated project number
pub async fn post(State(state): State<AppState>, ApiJson(input): ApiJson<CreateProject>) -> ApiResult<ProjectView> {
    create(&state, input)
        .await
        .map_err(|e| e.or_fallback("Failed to create project"))
}

async fn create(state: &AppState, input: CreateProject) -> ApiResult<ProjectView> {
    input.check_required()?;
    let customer = resolve_customer(state, input.customer_ref()).await?;

    let repo = state.repo::<Project>();
    let number = allocate_project_number(&repo).await?;
    let project = input.into_project(customer, number)?;

    repo.create(&project).await.map_err(|err| {
        if err.is_duplicate_key() {
            warn!("Project number {} taken concurrently", project.project_number);
            ApiError::Conflict("A project with this project number already exists".to_string())
        } else {
            err.into()
        }
    })?;

    info!("Created project {} ({})", project.project_number, project.id);
    Ok(ApiResponse::created(ProjectView::from(&project)))
}

/// First free `PRJ-NNNN` starting from the current millisecond clock.
async fn allocate_project_number(repo: &Repository<Project>) -> Result<String, ApiError> {
    let millis = Utc::now().timestamp_millis();
    for attempt in 0..10_000 {
        let candidate = project_number(millis, attempt);
        if !repo.exists(&Condition::eq("projectNumber", candidate.as_str())).await? {
            return Ok(candidate);
        }
    }
    Err(ApiError::internal("No free project numbers"))
}
