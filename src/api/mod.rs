pub mod extract;
pub mod format;
pub mod query;
pub mod response;

pub use extract::{object_id, ApiJson, ApiQuery};
pub use query::{ListQuery, ListSpec, Listing};
pub use response::{ApiResponse, ApiResult, Pagination};
