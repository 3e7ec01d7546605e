use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

pub static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email pattern"));

/// A document failed a model constraint. The message is user facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidDocument(pub String);

pub fn require_text(value: &str, message: &str) -> Result<(), InvalidDocument> {
    if value.trim().is_empty() {
        Err(InvalidDocument(message.to_string()))
    } else {
        Ok(())
    }
}

/// Run the derived constraints and report the first failure, taking fields
/// in declaration order.
pub fn check<T: Validate>(model: &T, field_order: &[&str]) -> Result<(), InvalidDocument> {
    let errors = match model.validate() {
        Ok(()) => return Ok(()),
        Err(errors) => errors,
    };
    let fields = errors.field_errors();
    let first = field_order
        .iter()
        .filter_map(|field| fields.get(*field))
        .chain(fields.values())
        .flat_map(|errors| errors.iter())
        .next();

    let message = first
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => format!("Validation failed: {}", error.code),
        })
        .unwrap_or_else(|| "Validation failed".to_string());
    Err(InvalidDocument(message))
}

/// Parse a stored enum value, e.g. `"in-progress"` into `TaskStatus`.
pub fn parse_enum<T: DeserializeOwned>(value: &str, path: &str) -> Result<T, InvalidDocument> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| InvalidDocument(format!("`{}` is not a valid enum value for path `{}`.", value, path)))
}

pub fn trim(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

pub fn trim_opt(value: Option<String>) -> Option<String> {
    value.map(trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(max = 3, message = "a too long"))]
        a: String,
        #[validate(length(max = 3, message = "b too long"))]
        b: String,
    }

    #[test]
    fn reports_first_field_in_declaration_order() {
        let sample = Sample { a: "long".into(), b: "long".into() };
        assert_eq!(check(&sample, &["b", "a"]), Err(InvalidDocument("b too long".into())));
        assert_eq!(check(&sample, &["a", "b"]), Err(InvalidDocument("a too long".into())));
        let ok = Sample { a: "x".into(), b: "y".into() };
        assert_eq!(check(&ok, &["a", "b"]), Ok(()));
    }

    #[test]
    fn email_pattern_matches_loose_addresses() {
        assert!(EMAIL_PATTERN.is_match("jane@x.com"));
        assert!(!EMAIL_PATTERN.is_match("jane@x"));
        assert!(!EMAIL_PATTERN.is_match("jane doe@x.com"));
    }

    #[test]
    fn require_text_rejects_blank() {
        assert!(require_text("  ", "Title is required").is_err());
        assert!(require_text("t", "Title is required").is_ok());
        assert_eq!(trim("  a b ".to_string()), "a b");
    }

    #[test]
    fn parse_enum_reports_path() {
        use crate::types::TaskStatus;
        assert_eq!(parse_enum::<TaskStatus>("completed", "status"), Ok(TaskStatus::Completed));
        assert_eq!(
            parse_enum::<TaskStatus>("done", "status").unwrap_err().0,
            "`done` is not a valid enum value for path `status`."
        );
    }
}
