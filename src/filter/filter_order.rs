use std::cmp::Ordering;

use bson::{doc, Bson, Document};

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse the `sortBy`/`sortOrder` query pair. `id` is an alias for `_id`.
    pub fn parse(sort_by: &str, sort_order: &str) -> Result<FilterOrderInfo, FilterError> {
        let column = sort_by.trim();
        Self::validate_column(column)?;
        let column = if column == "id" { "_id" } else { column };
        Ok(FilterOrderInfo {
            column: column.to_string(),
            sort: SortDirection::from_param(sort_order.trim()),
        })
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        let valid = !column.is_empty()
            && column
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(column.to_string()))
        }
    }

    pub fn to_document(info: &FilterOrderInfo) -> Document {
        doc! { info.column.as_str(): info.sort.to_bson() }
    }

    /// Compare two documents on the sort column, ties broken by `_id`.
    pub fn compare(info: &FilterOrderInfo, a: &Document, b: &Document) -> Ordering {
        let primary = Self::compare_values(a.get(&info.column), b.get(&info.column));
        let primary = match info.sort {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| Self::compare_values(a.get("_id"), b.get("_id")))
    }

    /// BSON comparison order: missing/null < numbers < strings < documents
    /// < arrays < object ids < booleans < datetimes.
    pub fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
        let (ra, rb) = (Self::type_rank(a), Self::type_rank(b));
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (a, b) {
            (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
            (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
            (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
            (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
            (Some(x), Some(y)) => match (Self::as_f64(x), Self::as_f64(y)) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
            _ => Ordering::Equal,
        }
    }

    fn type_rank(value: Option<&Bson>) -> u8 {
        match value {
            None | Some(Bson::Null) => 0,
            Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
            Some(Bson::String(_)) => 2,
            Some(Bson::Document(_)) => 3,
            Some(Bson::Array(_)) => 4,
            Some(Bson::ObjectId(_)) => 5,
            Some(Bson::Boolean(_)) => 6,
            Some(Bson::DateTime(_)) => 7,
            Some(_) => 8,
        }
    }

    fn as_f64(value: &Bson) -> Option<f64> {
        match value {
            Bson::Int32(v) => Some(f64::from(*v)),
            Bson::Int64(v) => Some(*v as f64),
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }
}
