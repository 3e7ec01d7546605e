use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::{present, Patch, Touched};
use super::validation::{check, parse_enum, require_text, trim, trim_opt, InvalidDocument};
use crate::api::format::{today, whole_number};
use crate::database::repository::Entity;
use crate::database::store::IndexSpec;
use crate::types::ProjectType;

pub const COLLECTION: &str = "projects";

pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::unique(COLLECTION, "projectNumber"),
    IndexSpec::asc(COLLECTION, "customer"),
    IndexSpec::asc(COLLECTION, "location"),
    IndexSpec::asc(COLLECTION, "projectType"),
    IndexSpec::desc(COLLECTION, "created"),
    IndexSpec::asc(COLLECTION, "openInvoice"),
    IndexSpec::asc(COLLECTION, "paidInvoice"),
];

pub const DEFAULT_LOCATION: &str = "TBD";
pub const UNKNOWN_CUSTOMER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[validate(length(max = 200, message = "Project name cannot exceed 200 characters"))]
    pub name: String,
    /// Customer name at the time of the last write.
    pub customer: String,
    pub location: String,
    pub project_type: ProjectType,
    #[validate(range(min = 0.0, message = "Open invoice cannot be negative"))]
    pub open_invoice: f64,
    #[validate(range(min = 0.0, message = "Paid invoice cannot be negative"))]
    pub paid_invoice: f64,
    pub created: String,
    pub project_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_variance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Entity for Project {
    const COLLECTION: &'static str = COLLECTION;

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Project {
    pub fn validate_document(&self) -> Result<(), InvalidDocument> {
        require_text(&self.name, "Project name is required")?;
        require_text(&self.customer, "Customer is required")?;
        require_text(&self.created, "Created date is required")?;
        require_text(&self.project_number, "Project number is required")?;
        check(
            self,
            &["name", "open_invoice", "paid_invoice", "description"],
        )
    }
}

/// `PRJ-` followed by four digits taken from `millis`, advanced by `attempt`
/// (wrapping at 10000) when earlier candidates were taken.
pub fn project_number(millis: i64, attempt: u32) -> String {
    let base = millis.rem_euclid(10_000);
    let n = (base + i64::from(attempt)).rem_euclid(10_000);
    format!("PRJ-{:04}", n)
}

/// Body of `POST /api/projects`. The form field names are accepted alongside
/// the stored ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, alias = "projectType", skip_serializing_if = "Option::is_none")]
    pub remodel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_invoice: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_invoice: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_variance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CreateProject {
    /// Required-field checks, run before the customer reference is resolved.
    pub fn check_required(&self) -> Result<(), InvalidDocument> {
        require_text(self.project_name.as_deref().unwrap_or_default(), "Project name is required")?;
        require_text(self.customer.as_deref().unwrap_or_default(), "Customer is required")?;
        require_text(self.remodel_type.as_deref().unwrap_or_default(), "Remodel type is required")?;
        Ok(())
    }

    pub fn customer_ref(&self) -> &str {
        self.customer.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn into_project(self, customer: String, project_number: String) -> Result<Project, InvalidDocument> {
        self.check_required()?;
        let project_type = parse_enum(
            self.remodel_type.as_deref().unwrap_or_default().trim(),
            "projectType",
        )?;

        let now = DateTime::now();
        let project = Project {
            id: ObjectId::new(),
            name: trim(self.project_name.unwrap_or_default()),
            customer: trim(customer),
            location: non_empty(self.location)
                .map(trim)
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            project_type,
            open_invoice: self.open_invoice.unwrap_or(0.0),
            paid_invoice: self.paid_invoice.unwrap_or(0.0),
            created: non_empty(self.created).map(trim).unwrap_or_else(today),
            project_number,
            budget_variance: trim_opt(self.budget_variance),
            description: trim_opt(non_empty(self.project_description).or(self.description)),
            cover_photo: trim_opt(self.cover_photo),
            created_at: now,
            updated_at: now,
        };
        project.validate_document()?;
        Ok(project)
    }
}

/// Body of `PUT /api/projects/:id`. `projectNumber` is not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub customer: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub location: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub project_type: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub open_invoice: Patch<f64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub paid_invoice: Patch<f64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub created: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub budget_variance: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cover_photo: Patch<String>,
}

impl UpdateProject {
    pub fn customer_ref(&self) -> Option<&str> {
        match &self.customer {
            Some(Some(customer)) => Some(customer.trim()),
            _ => None,
        }
    }

    pub fn with_customer(mut self, customer: String) -> Self {
        self.customer = Some(Some(customer));
        self
    }

    pub fn apply(self, project: &mut Project) -> Result<Vec<&'static str>, InvalidDocument> {
        let mut touched = Touched::default();
        touched
            .mark("name", &self.name)
            .mark("customer", &self.customer)
            .mark("location", &self.location)
            .mark("projectType", &self.project_type)
            .mark("openInvoice", &self.open_invoice)
            .mark("paidInvoice", &self.paid_invoice)
            .mark("created", &self.created)
            .mark("budgetVariance", &self.budget_variance)
            .mark("description", &self.description)
            .mark("coverPhoto", &self.cover_photo);

        if let Some(name) = self.name {
            project.name = trim(name.unwrap_or_default());
        }
        if let Some(customer) = self.customer {
            project.customer = trim(customer.unwrap_or_default());
        }
        if let Some(location) = self.location {
            project.location = location
                .map(trim)
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        }
        if let Some(project_type) = self.project_type {
            let value = project_type.unwrap_or_default();
            require_text(&value, "Project type is required")?;
            project.project_type = parse_enum(value.trim(), "projectType")?;
        }
        if let Some(open_invoice) = self.open_invoice {
            project.open_invoice = open_invoice.unwrap_or(0.0);
        }
        if let Some(paid_invoice) = self.paid_invoice {
            project.paid_invoice = paid_invoice.unwrap_or(0.0);
        }
        if let Some(created) = self.created {
            project.created = trim(created.unwrap_or_default());
        }
        if let Some(budget_variance) = self.budget_variance {
            project.budget_variance = trim_opt(budget_variance);
        }
        if let Some(description) = self.description {
            project.description = trim_opt(description);
        }
        if let Some(cover_photo) = self.cover_photo {
            project.cover_photo = trim_opt(cover_photo);
        }
        project.validate_document()?;

        let mut fields = touched.into_fields();
        if !fields.is_empty() {
            project.updated_at = DateTime::now();
            fields.push("updatedAt");
        }
        Ok(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub customer: String,
    pub location: String,
    pub project_type: ProjectType,
    #[serde(serialize_with = "whole_number")]
    pub open_invoice: f64,
    #[serde(serialize_with = "whole_number")]
    pub paid_invoice: f64,
    pub created: String,
    pub project_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_variance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.to_hex(),
            name: project.name.clone(),
            customer: project.customer.clone(),
            location: project.location.clone(),
            project_type: project.project_type,
            open_invoice: project.open_invoice,
            paid_invoice: project.paid_invoice,
            created: project.created.clone(),
            project_number: project.project_number.clone(),
            budget_variance: project.budget_variance.clone(),
            description: project.description.clone(),
            cover_photo: project.cover_photo.clone(),
        }
    }
}
