use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::{present, Patch, Touched};
use super::validation::{check, parse_enum, require_text, trim, trim_opt, InvalidDocument};
use crate::api::format::{iso_date, iso_datetime, parse_date};
use crate::database::repository::Entity;
use crate::database::store::IndexSpec;
use crate::types::{TaskPriority, TaskStatus};

pub const COLLECTION: &str = "tasks";

pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::asc(COLLECTION, "status"),
    IndexSpec::asc(COLLECTION, "priority"),
    IndexSpec::asc(COLLECTION, "dueDate"),
    IndexSpec::desc(COLLECTION, "createdAt"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[validate(length(max = 200, message = "Title cannot exceed 200 characters"))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Entity for Task {
    const COLLECTION: &'static str = COLLECTION;

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Task {
    pub fn validate_document(&self) -> Result<(), InvalidDocument> {
        require_text(&self.title, "Title is required")?;
        check(self, &["title", "description"])
    }
}

/// Falsy due dates (missing, `null`, `""`) mean no date.
fn due_date(value: Option<&str>) -> Result<Option<DateTime>, InvalidDocument> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| InvalidDocument("Invalid due date".to_string())),
    }
}

fn status_or_default(value: Option<&str>) -> Result<TaskStatus, InvalidDocument> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(TaskStatus::default()),
        Some(value) => parse_enum(value, "status"),
    }
}

fn priority_or_default(value: Option<&str>) -> Result<TaskPriority, InvalidDocument> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(TaskPriority::default()),
        Some(value) => parse_enum(value, "priority"),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl CreateTask {
    pub fn into_task(self) -> Result<Task, InvalidDocument> {
        let title = self.title.unwrap_or_default();
        require_text(&title, "Title is required")?;

        let now = DateTime::now();
        let task = Task {
            id: ObjectId::new(),
            title: trim(title),
            description: trim_opt(self.description),
            status: status_or_default(self.status.as_deref())?,
            priority: priority_or_default(self.priority.as_deref())?,
            due_date: due_date(self.due_date.as_deref())?,
            created_at: now,
            updated_at: now,
        };
        task.validate_document()?;
        Ok(task)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub status: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub priority: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub due_date: Patch<String>,
}

impl UpdateTask {
    pub fn apply(self, task: &mut Task) -> Result<Vec<&'static str>, InvalidDocument> {
        let mut touched = Touched::default();
        touched
            .mark("title", &self.title)
            .mark("description", &self.description)
            .mark("status", &self.status)
            .mark("priority", &self.priority)
            .mark("dueDate", &self.due_date);

        if let Some(title) = self.title {
            task.title = trim(title.unwrap_or_default());
        }
        if let Some(description) = self.description {
            task.description = trim_opt(description);
        }
        if let Some(status) = self.status {
            task.status = parse_enum(status.unwrap_or_default().trim(), "status")?;
        }
        if let Some(priority) = self.priority {
            task.priority = parse_enum(priority.unwrap_or_default().trim(), "priority")?;
        }
        if let Some(value) = self.due_date {
            task.due_date = due_date(value.as_deref())?;
        }
        task.validate_document()?;

        let mut fields = touched.into_fields();
        if !fields.is_empty() {
            task.updated_at = DateTime::now();
            fields.push("updatedAt");
        }
        Ok(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_hex(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date.as_ref().map(iso_date),
            created_at: iso_datetime(&task.created_at),
            updated_at: iso_datetime(&task.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(json: serde_json::Value) -> Result<Task, InvalidDocument> {
        serde_json::from_value::<CreateTask>(json).unwrap().into_task()
    }

    #[test]
    fn create_defaults_status_and_priority() {
        let task = create(serde_json::json!({ "title": "Order tiles" })).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.due_date, None);

        let task = create(serde_json::json!({ "title": "t", "status": "", "dueDate": "" })).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn create_rejects_blank_title_and_bad_enums() {
        assert_eq!(create(serde_json::json!({ "title": "  " })).unwrap_err().0, "Title is required");
        assert_eq!(
            create(serde_json::json!({ "title": "t", "priority": "urgent" })).unwrap_err().0,
            "`urgent` is not a valid enum value for path `priority`."
        );
        assert_eq!(
            create(serde_json::json!({ "title": "t", "dueDate": "soon" })).unwrap_err().0,
            "Invalid due date"
        );
    }

    #[test]
    fn view_formats_dates() {
        let task = create(serde_json::json!({ "title": "t", "dueDate": "2025-12-31T18:30:00.000Z" })).unwrap();
        let view = TaskView::from(&task);
        assert_eq!(view.due_date.as_deref(), Some("2025-12-31"));
        assert!(view.created_at.ends_with('Z'));
        assert_eq!(view.created_at.len(), "2025-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn status_only_update_leaves_the_rest() {
        let mut task = create(serde_json::json!({
            "title": "t", "description": "d", "priority": "high", "dueDate": "2025-12-31"
        }))
        .unwrap();
        let before = task.clone();
        let patch: UpdateTask = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        let fields = patch.apply(&mut task).unwrap();

        assert_eq!(fields, vec!["status", "updatedAt"]);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.priority, before.priority);
        assert_eq!(task.due_date, before.due_date);
    }

    #[test]
    fn falsy_due_date_clears_it() {
        let mut task = create(serde_json::json!({ "title": "t", "dueDate": "2025-12-31" })).unwrap();
        let patch: UpdateTask = serde_json::from_str(r#"{"dueDate":""}"#).unwrap();
        patch.apply(&mut task).unwrap();
        assert_eq!(task.due_date, None);

        let mut task = create(serde_json::json!({ "title": "t", "dueDate": "2025-12-31" })).unwrap();
        let patch: UpdateTask = serde_json::from_str(r#"{"dueDate":null}"#).unwrap();
        assert_eq!(patch.apply(&mut task).unwrap(), vec!["dueDate", "updatedAt"]);
        assert_eq!(task.due_date, None);
    }
}
