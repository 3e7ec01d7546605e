use axum::extract::{Path, State};
use tracing::info;

use super::{duplicate_email, DUPLICATE_EMAIL};
use crate::api::{object_id, ApiJson, ApiResponse, ApiResult};
use crate::database::models::{Customer, CustomerView, UpdateCustomer};
use crate::error::ApiError;
use crate::filter::Condition;
use crate::state::AppState;

fn not_found() -> ApiError {
    ApiError::not_found("Customer not found")
}

/// GET /api/customers/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CustomerView> {
    let id = object_id(&id, "customer")?;
    let customer = state
        .repo::<Customer>()
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to fetch customer"))?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(CustomerView::from(&customer)))
}

/// PUT /api/customers/:id - Patch the fields present in the body
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UpdateCustomer>,
) -> ApiResult<CustomerView> {
    update(&state, &id, patch)
        .await
        .map_err(|e| e.or_fallback("Failed to update customer"))
}

async fn update(state: &AppState, id: &str, patch: UpdateCustomer) -> ApiResult<CustomerView> {
    let id = object_id(id, "customer")?;
    let repo = state.repo::<Customer>();

    if let Some(email) = patch.email_change() {
        let taken = Condition::all_of(vec![Condition::eq("email", email), Condition::ne("_id", id)]);
        if repo.exists(&taken).await? {
            return Err(ApiError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
    }

    let mut customer = repo.find_by_id(id).await?.ok_or_else(not_found)?;
    let fields = patch.apply(&mut customer)?;
    if fields.is_empty() {
        return Ok(ApiResponse::success(CustomerView::from(&customer)));
    }

    let updated = repo
        .update_fields(&customer, &fields)
        .await
        .map_err(duplicate_email)?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(CustomerView::from(&updated)))
}

/// DELETE /api/customers/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CustomerView> {
    let id = object_id(&id, "customer")?;
    let customer = state
        .repo::<Customer>()
        .delete_by_id(id)
        .await
        .map_err(|e| ApiError::from(e).or_fallback("Failed to delete customer"))?
        .ok_or_else(not_found)?;

    info!("Deleted customer {}", customer.id);
    Ok(ApiResponse::success(CustomerView::from(&customer)).with_message("Customer deleted successfully"))
}
