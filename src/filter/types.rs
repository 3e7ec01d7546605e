use bson::Bson;

/// A query condition over the top-level fields of a stored document.
///
/// Conditions are backend-neutral: the MongoDB store compiles them to a BSON
/// filter document, the memory store evaluates them directly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// Matches every document.
    #[default]
    All,
    Eq { column: String, value: Bson },
    Ne { column: String, value: Bson },
    In { column: String, values: Vec<Bson> },
    /// Case-insensitive literal substring match on a string field.
    Contains { column: String, needle: String },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `asc` sorts ascending; any other value sorts descending.
    pub fn from_param(value: &str) -> Self {
        if value == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn to_bson(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// Everything a store needs to run a paged find.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterData {
    pub where_clause: Condition,
    pub order: Option<FilterOrderInfo>,
    pub offset: u64,
    pub limit: Option<u64>,
}
