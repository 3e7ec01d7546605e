use clap::Subcommand;

use super::resource::{self, Resource, ResourceCommands};
use crate::cli::utils::output_envelope;
use crate::cli::OutputFormat;
use crate::client::BuildProClient;
use crate::types::{TaskPriority, TaskStatus};

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(flatten)]
    Record(ResourceCommands),

    #[command(about = "Delete several tasks at once")]
    BulkDelete {
        #[arg(required = true, help = "Task IDs")]
        ids: Vec<String>,
    },

    #[command(about = "Set the status of several tasks")]
    BulkStatus {
        #[arg(value_parser = parse_status, help = "pending, in-progress or completed")]
        status: TaskStatus,
        #[arg(required = true, help = "Task IDs")]
        ids: Vec<String>,
    },

    #[command(about = "Set the priority of several tasks")]
    BulkPriority {
        #[arg(value_parser = parse_priority, help = "low, medium or high")]
        priority: TaskPriority,
        #[arg(required = true, help = "Task IDs")]
        ids: Vec<String>,
    },
}

fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("`{}` is not a task status", raw))
}

fn parse_priority(raw: &str) -> Result<TaskPriority, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("`{}` is not a task priority", raw))
}

pub async fn handle(client: &BuildProClient, cmd: TaskCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TaskCommands::Record(cmd) => resource::handle(client, Resource::Tasks, cmd, output_format).await,
        TaskCommands::BulkDelete { ids } => {
            let envelope = client.bulk_delete_tasks(&ids).await;
            output_envelope(&output_format, &envelope, "Tasks deleted")
        }
        TaskCommands::BulkStatus { status, ids } => {
            let envelope = client.bulk_update_task_status(&ids, status).await;
            output_envelope(&output_format, &envelope, "Task status updated")
        }
        TaskCommands::BulkPriority { priority, ids } => {
            let envelope = client.bulk_update_task_priority(&ids, priority).await;
            output_envelope(&output_format, &envelope, "Task priority updated")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_enums() {
        assert_eq!(parse_status("in-progress").unwrap(), TaskStatus::InProgress);
        assert!(parse_status("done").is_err());
        assert_eq!(parse_priority("high").unwrap(), TaskPriority::High);
        assert!(parse_priority("urgent").is_err());
    }
}
