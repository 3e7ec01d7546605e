use bson::{doc, Bson, Document};

use super::types::Condition;

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<Bson>) -> Self {
        Condition::Eq { column: column.into(), value: value.into() }
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Bson>) -> Self {
        Condition::Ne { column: column.into(), value: value.into() }
    }

    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        Condition::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Condition::Contains { column: column.into(), needle: needle.into() }
    }

    /// Conjunction that drops `All` operands and collapses single-element lists.
    pub fn all_of(conditions: Vec<Condition>) -> Self {
        let mut parts: Vec<Condition> = conditions
            .into_iter()
            .filter(|c| *c != Condition::All)
            .collect();
        match parts.len() {
            0 => Condition::All,
            1 => parts.remove(0),
            _ => Condition::And(parts),
        }
    }

    pub fn any_of(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }
}

pub struct FilterWhere;

impl FilterWhere {
    /// Compile a condition into a MongoDB filter document.
    pub fn to_document(condition: &Condition) -> Document {
        match condition {
            Condition::All => Document::new(),
            Condition::Eq { column, value } => doc! { column.as_str(): value.clone() },
            Condition::Ne { column, value } => doc! { column.as_str(): { "$ne": value.clone() } },
            Condition::In { column, values } => {
                doc! { column.as_str(): { "$in": values.clone() } }
            }
            Condition::Contains { column, needle } => doc! {
                column.as_str(): { "$regex": regex::escape(needle), "$options": "i" }
            },
            Condition::And(parts) => {
                let parts: Vec<Document> = parts.iter().map(Self::to_document).collect();
                doc! { "$and": parts }
            }
            Condition::Or(parts) => {
                let parts: Vec<Document> = parts.iter().map(Self::to_document).collect();
                doc! { "$or": parts }
            }
        }
    }

    /// Evaluate a condition against a document the way MongoDB would for
    /// the subset of operators `Condition` supports.
    pub fn matches(condition: &Condition, document: &Document) -> bool {
        match condition {
            Condition::All => true,
            Condition::Eq { column, value } => Self::field_equals(document, column, value),
            Condition::Ne { column, value } => !Self::field_equals(document, column, value),
            Condition::In { column, values } => {
                values.iter().any(|v| Self::field_equals(document, column, v))
            }
            Condition::Contains { column, needle } => match document.get(column) {
                Some(Bson::String(s)) => s.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Condition::And(parts) => parts.iter().all(|c| Self::matches(c, document)),
            Condition::Or(parts) => parts.iter().any(|c| Self::matches(c, document)),
        }
    }

    fn field_equals(document: &Document, column: &str, value: &Bson) -> bool {
        match (document.get(column), value) {
            // A null query value matches both explicit nulls and missing fields.
            (None, Bson::Null) | (Some(Bson::Null), Bson::Null) => true,
            (None, _) => false,
            (Some(Bson::Int32(a)), Bson::Int64(b)) => i64::from(*a) == *b,
            (Some(Bson::Int64(a)), Bson::Int32(b)) => *a == i64::from(*b),
            (Some(Bson::Double(a)), Bson::Int32(b)) => *a == f64::from(*b),
            (Some(Bson::Double(a)), Bson::Int64(b)) => *a == *b as f64,
            (Some(Bson::Int32(a)), Bson::Double(b)) => f64::from(*a) == *b,
            (Some(Bson::Int64(a)), Bson::Double(b)) => *a as f64 == *b,
            (Some(actual), expected) => actual == expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn compiles_search_to_escaped_case_insensitive_regex() {
        let cond = Condition::any_of(vec![
            Condition::contains("name", "a.b"),
            Condition::contains("email", "x"),
        ]);
        let doc = FilterWhere::to_document(&cond);
        assert_eq!(
            doc,
            doc! { "$or": [
                { "name": { "$regex": "a\\.b", "$options": "i" } },
                { "email": { "$regex": "x", "$options": "i" } },
            ] }
        );
    }

    #[test]
    fn all_of_collapses_trivial_conjunctions() {
        assert_eq!(Condition::all_of(vec![]), Condition::All);
        assert_eq!(
            Condition::all_of(vec![Condition::All, Condition::eq("status", "pending")]),
            Condition::eq("status", "pending")
        );
        assert!(FilterWhere::to_document(&Condition::All).is_empty());
    }

    #[test]
    fn contains_matches_case_insensitively_and_literally() {
        let doc = doc! { "name": "Jane Doe", "email": "jane@x.com" };
        assert!(FilterWhere::matches(&Condition::contains("name", "jANE"), &doc));
        assert!(!FilterWhere::matches(&Condition::contains("name", "j.ne"), &doc));
        assert!(!FilterWhere::matches(&Condition::contains("phone", "1"), &doc));
    }

    #[test]
    fn equality_and_membership() {
        let id = ObjectId::new();
        let other = ObjectId::new();
        let doc = doc! { "_id": id, "status": "pending", "fileSize": 10_i64 };

        assert!(FilterWhere::matches(&Condition::eq("status", "pending"), &doc));
        assert!(!FilterWhere::matches(&Condition::ne("_id", id), &doc));
        assert!(FilterWhere::matches(&Condition::in_list("_id", vec![other, id]), &doc));
        assert!(FilterWhere::matches(&Condition::eq("fileSize", 10_i32), &doc));
        assert!(FilterWhere::matches(&Condition::eq("dueDate", Bson::Null), &doc));
    }
}
