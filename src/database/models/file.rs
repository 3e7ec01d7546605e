use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::{present, Patch, Touched};
use super::validation::{check, require_text, trim, trim_opt, InvalidDocument};
use crate::api::format::iso_datetime;
use crate::database::repository::Entity;
use crate::database::store::IndexSpec;

pub const COLLECTION: &str = "files";

pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::asc(COLLECTION, "name"),
    IndexSpec::asc(COLLECTION, "category"),
    IndexSpec::asc(COLLECTION, "projectId"),
    IndexSpec::asc(COLLECTION, "customerId"),
    IndexSpec::desc(COLLECTION, "createdAt"),
];

/// Metadata for an uploaded file. The bytes live under the uploads directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[validate(length(max = 200, message = "File name cannot exceed 200 characters"))]
    pub name: String,
    pub file_name: String,
    pub file_type: String,
    #[validate(range(min = 0, message = "File size cannot be negative"))]
    pub file_size: i64,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Entity for FileRecord {
    const COLLECTION: &'static str = COLLECTION;

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl FileRecord {
    pub fn validate_document(&self) -> Result<(), InvalidDocument> {
        require_text(&self.name, "File name is required")?;
        require_text(&self.file_name, "File name is required")?;
        require_text(&self.file_type, "File type is required")?;
        require_text(&self.file_url, "File URL is required")?;
        check(self, &["name", "file_size", "description"])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
}

impl CreateFile {
    pub fn into_file(self) -> Result<FileRecord, InvalidDocument> {
        let name = self.name.unwrap_or_default();
        require_text(&name, "File name is required")?;
        let file_name = self.file_name.unwrap_or_default();
        require_text(&file_name, "File name is required")?;
        let file_type = self.file_type.unwrap_or_default();
        require_text(&file_type, "File type is required")?;
        let file_size = self
            .file_size
            .ok_or_else(|| InvalidDocument("File size is required".to_string()))?;
        let file_url = self.file_url.unwrap_or_default();
        require_text(&file_url, "File URL is required")?;

        let now = DateTime::now();
        let file = FileRecord {
            id: ObjectId::new(),
            name: trim(name),
            file_name: trim(file_name),
            file_type: trim(file_type),
            file_size,
            file_url: trim(file_url),
            description: trim_opt(self.description),
            category: trim_opt(self.category),
            project_id: trim_opt(self.project_id),
            customer_id: trim_opt(self.customer_id),
            uploaded_by: trim_opt(self.uploaded_by),
            created_at: now,
            updated_at: now,
        };
        file.validate_document()?;
        Ok(file)
    }
}

/// Only descriptive metadata and associations can change after upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFile {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub category: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub project_id: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub customer_id: Patch<String>,
}

impl UpdateFile {
    pub fn apply(self, file: &mut FileRecord) -> Result<Vec<&'static str>, InvalidDocument> {
        let mut touched = Touched::default();
        touched
            .mark("name", &self.name)
            .mark("description", &self.description)
            .mark("category", &self.category)
            .mark("projectId", &self.project_id)
            .mark("customerId", &self.customer_id);

        if let Some(name) = self.name {
            file.name = trim(name.unwrap_or_default());
        }
        if let Some(description) = self.description {
            file.description = trim_opt(description);
        }
        if let Some(category) = self.category {
            file.category = trim_opt(category);
        }
        if let Some(project_id) = self.project_id {
            file.project_id = trim_opt(project_id);
        }
        if let Some(customer_id) = self.customer_id {
            file.customer_id = trim_opt(customer_id);
        }
        file.validate_document()?;

        let mut fields = touched.into_fields();
        if !fields.is_empty() {
            file.updated_at = DateTime::now();
            fields.push("updatedAt");
        }
        Ok(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub id: String,
    pub name: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&FileRecord> for FileView {
    fn from(file: &FileRecord) -> Self {
        Self {
            id: file.id.to_hex(),
            name: file.name.clone(),
            file_name: file.file_name.clone(),
            file_type: file.file_type.clone(),
            file_size: file.file_size,
            file_url: file.file_url.clone(),
            description: file.description.clone(),
            category: file.category.clone(),
            project_id: file.project_id.clone(),
            customer_id: file.customer_id.clone(),
            uploaded_by: file.uploaded_by.clone(),
            created_at: iso_datetime(&file.created_at),
            updated_at: iso_datetime(&file.updated_at),
        }
    }
}
