pub mod collection;
pub mod record;

use bson::oid::ObjectId;

use crate::database::models::project::UNKNOWN_CUSTOMER;
use crate::database::models::Customer;
use crate::error::ApiError;
use crate::state::AppState;

pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;

/// Resolve a project's `customer` input. Object ids are replaced by that
/// customer's current name; other strings are kept as written.
pub(crate) async fn resolve_customer(state: &AppState, reference: &str) -> Result<String, ApiError> {
    match ObjectId::parse_str(reference) {
        Ok(id) => Ok(state
            .repo::<Customer>()
            .find_by_id(id)
            .await?
            .map(|customer| customer.name)
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string())),
        Err(_) => Ok(reference.to_string()),
    }
}
