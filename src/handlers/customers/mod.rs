pub mod collection;
pub mod record;

use crate::database::StoreError;
use crate::error::ApiError;

pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;

pub(crate) const DUPLICATE_EMAIL: &str = "A customer with this email already exists";

/// The unique email index fired between our pre-check and the write.
pub(crate) fn duplicate_email(err: StoreError) -> ApiError {
    if err.is_duplicate_key() {
        tracing::warn!("Customer email uniqueness enforced by index: {}", err);
        ApiError::Conflict(DUPLICATE_EMAIL.to_string())
    } else {
        err.into()
    }
}
