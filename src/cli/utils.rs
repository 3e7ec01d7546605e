use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::ApiEnvelope;

/// Print a server envelope. A failed envelope is reported and turned into an
/// error so the process exits non-zero.
pub fn output_envelope<T: Serialize>(
    output_format: &OutputFormat,
    envelope: &ApiEnvelope<T>,
    default_message: &str,
) -> anyhow::Result<()> {
    if !envelope.success {
        let message = envelope.error.clone().unwrap_or_else(|| "Request failed".to_string());
        if let OutputFormat::Json = output_format {
            println!("{}", serde_json::to_string_pretty(envelope)?);
        }
        anyhow::bail!(message);
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(envelope)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", envelope.message.as_deref().unwrap_or(default_message));
            if let Some(data) = &envelope.data {
                print_text(&serde_json::to_value(data)?);
            }
            for (key, value) in &envelope.extra {
                println!("{}: {}", key, compact(value));
            }
            if let Some(p) = &envelope.pagination {
                println!("page {}/{} ({} total, {} per page)", p.page, p.pages, p.total, p.limit);
            }
        }
    }
    Ok(())
}

fn print_text(data: &Value) {
    match data {
        Value::Array(items) if items.is_empty() => println!("(no records)"),
        Value::Array(items) => {
            for item in items {
                println!("{}\t{}", field(item, "id"), label(item));
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                println!("{:>16}: {}", key, compact(value));
            }
        }
        other => println!("{}", compact(other)),
    }
}

fn field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or("")
}

fn label(item: &Value) -> String {
    ["name", "title", "email"]
        .iter()
        .map(|key| field(item, key))
        .find(|v| !v.is_empty())
        .unwrap_or("")
        .to_string()
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a JSON document from stdin and decode it into `T`.
pub fn read_stdin_json<T: DeserializeOwned>() -> anyhow::Result<T> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    parse_json_input(&input)
}

pub fn parse_json_input<T: DeserializeOwned>(input: &str) -> anyhow::Result<T> {
    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("Expected a JSON object on stdin");
    }
    serde_json::from_str(input).map_err(|e| anyhow::anyhow!("Invalid JSON input: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::database::models::UpdateTask;

    #[test]
    fn labels_prefer_name_then_title() {
        assert_eq!(label(&json!({ "id": "1", "name": "Build House" })), "Build House");
        assert_eq!(label(&json!({ "id": "2", "title": "Pour slab" })), "Pour slab");
        assert_eq!(label(&json!({ "id": "3" })), "");
    }

    #[test]
    fn parses_patch_input() {
        let patch: UpdateTask = parse_json_input(r#"{ "status": "completed", "dueDate": null }"#).unwrap();
        assert_eq!(patch.status, Some(Some("completed".to_string())));
        assert_eq!(patch.due_date, Some(None));
        assert!(patch.title.is_none());

        assert!(parse_json_input::<UpdateTask>("   ").is_err());
        assert!(parse_json_input::<UpdateTask>("{").is_err());
    }
}
