use serde::Deserialize;

use crate::error::ApiError;
use crate::filter::Filter;

/// Defaults for one list endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    pub search_columns: &'static [&'static str],
    pub sort_by: &'static str,
    pub sort_order: &'static str,
    pub limit: u64,
}

/// Query string of the list endpoints. Everything is read as text and
/// parsed leniently.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub customer: Option<String>,
    pub location: Option<String>,
    pub project_type: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub project_id: Option<String>,
    pub customer_id: Option<String>,
}

/// A filter with search, sort and paging applied, plus the page/limit to report.
pub struct Listing {
    pub filter: Filter,
    pub page: u64,
    pub limit: u64,
}

fn positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .map(|v| v as u64)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ListQuery {
    pub fn page(&self) -> u64 {
        positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn limit(&self, default: u64) -> u64 {
        positive(self.limit.as_deref()).unwrap_or(default)
    }

    pub fn listing(&self, spec: &ListSpec, max_limit: Option<u64>) -> Result<Listing, ApiError> {
        let page = self.page();
        let sort_by = non_empty(&self.sort_by).unwrap_or(spec.sort_by);
        let sort_order = non_empty(&self.sort_order).unwrap_or(spec.sort_order);

        let filter = Filter::new()
            .max_limit(max_limit)
            .search(spec.search_columns, self.search.as_deref())
            .order(sort_by, sort_order)?
            .paginate(page, self.limit(spec.limit));
        let limit = filter.applied_limit().unwrap_or(spec.limit);
        Ok(Listing { filter, page, limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Condition, SortDirection};

    const SPEC: ListSpec = ListSpec {
        search_columns: &["name", "email"],
        sort_by: "name",
        sort_order: "asc",
        limit: 100,
    };

    fn query(json: serde_json::Value) -> ListQuery {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn lenient_page_and_limit() {
        let q = query(serde_json::json!({ "page": "abc", "limit": "-5" }));
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(100), 100);
        let q = query(serde_json::json!({ "page": "0", "limit": "0" }));
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(10), 10);
        let q = query(serde_json::json!({ "page": "3", "limit": "25" }));
        assert_eq!((q.page(), q.limit(10)), (3, 25));
    }

    #[test]
    fn listing_uses_defaults() {
        let listing = ListQuery::default().listing(&SPEC, None).unwrap();
        let data = listing.filter.build();
        assert_eq!((listing.page, listing.limit), (1, 100));
        let order = data.order.unwrap();
        assert_eq!(order.column, "name");
        assert_eq!(order.sort, SortDirection::Asc);
        assert_eq!(data.where_clause, Condition::All);
    }

    #[test]
    fn listing_caps_limit_and_rejects_bad_sort() {
        let q = query(serde_json::json!({ "limit": "5000", "page": "2" }));
        let listing = q.listing(&SPEC, Some(1000)).unwrap();
        assert_eq!(listing.limit, 1000);
        assert_eq!(listing.filter.build().offset, 1000);

        let q = query(serde_json::json!({ "sortBy": "$where" }));
        let err = q.listing(&SPEC, None).err().unwrap();
        assert_eq!(err, ApiError::BadRequest("Invalid sort field: $where".to_string()));
    }
}
