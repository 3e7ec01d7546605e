//! Shared types used across the server, client and CLI

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Project category, stored under `projectType` and accepted as `remodelType` on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    #[serde(rename = "Residential Build")]
    ResidentialBuild,
    #[serde(rename = "High-Rise Construction")]
    HighRiseConstruction,
    Commercial,
    Renovation,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::ResidentialBuild => "Residential Build",
            ProjectType::HighRiseConstruction => "High-Rise Construction",
            ProjectType::Commercial => "Commercial",
            ProjectType::Renovation => "Renovation",
        }
    }
}

/// Operations accepted by `POST /api/tasks/bulk`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulkOperation {
    Delete,
    UpdateStatus,
    UpdatePriority,
}

impl BulkOperation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "delete" => Some(BulkOperation::Delete),
            "updateStatus" => Some(BulkOperation::UpdateStatus),
            "updatePriority" => Some(BulkOperation::UpdatePriority),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_stored_spellings() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "in-progress");
        assert_eq!(serde_json::to_value(TaskPriority::High).unwrap(), "high");
        assert_eq!(
            serde_json::from_value::<ProjectType>("High-Rise Construction".into()).unwrap(),
            ProjectType::HighRiseConstruction
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default().as_str(), "medium");
    }

    #[test]
    fn bulk_operation_names() {
        assert_eq!(BulkOperation::parse("updateStatus"), Some(BulkOperation::UpdateStatus));
        assert_eq!(BulkOperation::parse("archive"), None);
    }
}
