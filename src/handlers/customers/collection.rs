use axum::extract::State;
use tracing::info;

use super::{duplicate_email, DUPLICATE_EMAIL};
use crate::api::{ApiJson, ApiQuery, ApiResponse, ApiResult, ListQuery, ListSpec, Pagination};
use crate::database::models::{CreateCustomer, Customer, CustomerView};
use crate::error::ApiError;
use crate::filter::Condition;
use crate::state::AppState;

const LIST: ListSpec = ListSpec {
    search_columns: &["name", "email"],
    sort_by: "name",
    sort_order: "asc",
    limit: 100,
};

/// GET /api/customers - Search and page through customers
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<CustomerView>> {
    list(&state, &query)
        .await
        .map_err(|e| e.or_fallback("Failed to fetch customers"))
}

async fn list(state: &AppState, query: &ListQuery) -> ApiResult<Vec<CustomerView>> {
    let listing = query.listing(&LIST, state.config.filter.max_limit)?;
    let page = state.repo::<Customer>().select_page(&listing.filter.build()).await?;

    let data = page.items.iter().map(CustomerView::from).collect();
    Ok(ApiResponse::paginated(
        data,
        Pagination::new(listing.page, listing.limit, page.total),
    ))
}

/// POST /api/customers - Create a customer with a unique email
pub async fn post(State(state): State<AppState>, ApiJson(input): ApiJson<CreateCustomer>) -> ApiResult<CustomerView> {
    create(&state, input)
        .await
        .map_err(|e| e.or_fallback("Failed to create customer"))
}

async fn create(state: &AppState, input: CreateCustomer) -> ApiResult<CustomerView> {
    let customer = input.into_customer()?;
    let repo = state.repo::<Customer>();

    if repo.exists(&Condition::eq("email", customer.email.as_str())).await? {
        return Err(ApiError::Conflict(DUPLICATE_EMAIL.to_string()));
    }
    repo.create(&customer).await.map_err(duplicate_email)?;

    info!("Created customer {} <{}>", customer.id, customer.email);
    Ok(ApiResponse::created(CustomerView::from(&customer)))
}
