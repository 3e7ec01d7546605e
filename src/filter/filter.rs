use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{Condition, FilterData, FilterOrderInfo};

/// MongoDB encodes skip and limit as signed 64-bit integers.
const MAX_BSON_INT: u64 = i64::MAX as u64;

/// Builder for a paged, sorted query over one collection.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
    order: Option<FilterOrderInfo>,
    limit: Option<u64>,
    offset: u64,
    max_limit: Option<u64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap applied to any later `paginate` call.
    pub fn max_limit(mut self, max_limit: Option<u64>) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn where_clause(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Case-insensitive substring search over `columns`. Empty terms are ignored.
    pub fn search(self, columns: &[&str], term: Option<&str>) -> Self {
        match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => {
                let any = columns
                    .iter()
                    .map(|column| Condition::contains(*column, term))
                    .collect();
                self.where_clause(Condition::any_of(any))
            }
            None => self,
        }
    }

    /// Exact match on `column` when a non-empty value is supplied.
    pub fn equals(self, column: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.where_clause(Condition::eq(column, value)),
            None => self,
        }
    }

    pub fn order(mut self, sort_by: &str, sort_order: &str) -> Result<Self, FilterError> {
        self.order = Some(FilterOrder::parse(sort_by, sort_order)?);
        Ok(self)
    }

    /// Page numbers start at 1. Offset and limit never exceed `i64::MAX`.
    pub fn paginate(mut self, page: u64, limit: u64) -> Self {
        let limit = match self.max_limit {
            Some(max) if limit > max => {
                tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max);
                max
            }
            _ => limit,
        };
        let limit = limit.min(MAX_BSON_INT);
        self.limit = Some(limit);
        self.offset = page.saturating_sub(1).saturating_mul(limit).min(MAX_BSON_INT);
        self
    }

    pub fn applied_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn build(self) -> FilterData {
        FilterData {
            where_clause: Condition::all_of(self.conditions),
            order: self.order,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;

    #[test]
    fn builds_search_filters_and_paging() {
        let data = Filter::new()
            .search(&["name", "email"], Some(" jane "))
            .equals("status", Some("pending"))
            .equals("priority", Some(""))
            .order("name", "asc")
            .unwrap()
            .paginate(2, 10)
            .build();

        assert_eq!(
            data.where_clause,
            Condition::And(vec![
                Condition::Or(vec![
                    Condition::contains("name", "jane"),
                    Condition::contains("email", "jane"),
                ]),
                Condition::eq("status", "pending"),
            ])
        );
        assert_eq!(data.order.unwrap().sort, SortDirection::Asc);
        assert_eq!(data.offset, 10);
        assert_eq!(data.limit, Some(10));
    }

    #[test]
    fn max_limit_caps_page_size() {
        let filter = Filter::new().max_limit(Some(50)).paginate(3, 500);
        assert_eq!(filter.applied_limit(), Some(50));
        assert_eq!(filter.build().offset, 100);
    }

    #[test]
    fn huge_pages_stay_within_i64() {
        let data = Filter::new().paginate(922_337_203_685_477_580, 100).build();
        assert_eq!(data.offset, i64::MAX as u64);
        assert_eq!(data.limit, Some(100));

        let data = Filter::new().paginate(2, u64::MAX).build();
        assert_eq!(data.limit, Some(i64::MAX as u64));
        assert_eq!(data.offset, i64::MAX as u64);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let data = Filter::new().search(&["name"], Some("  ")).build();
        assert_eq!(data.where_clause, Condition::All);
        assert_eq!(data.limit, None);
    }
}
