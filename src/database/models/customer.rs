use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::patch::{present, Patch, Touched};
use super::validation::{check, require_text, trim, trim_opt, InvalidDocument, EMAIL_PATTERN};
use crate::database::repository::Entity;
use crate::database::store::IndexSpec;

pub const COLLECTION: &str = "customers";

pub const INDEXES: &[IndexSpec] = &[
    IndexSpec::unique(COLLECTION, "email"),
    IndexSpec::asc(COLLECTION, "name"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[validate(length(max = 200, message = "Customer name cannot exceed 200 characters"))]
    pub name: String,
    #[validate(regex(path = *EMAIL_PATTERN, message = "Please provide a valid email address"))]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Address cannot exceed 500 characters"))]
    pub address: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Entity for Customer {
    const COLLECTION: &'static str = COLLECTION;

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Emails are compared and stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Customer {
    pub fn validate_document(&self) -> Result<(), InvalidDocument> {
        require_text(&self.name, "Customer name is required")?;
        require_text(&self.email, "Email is required")?;
        check(self, &["name", "email", "phone", "address"])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl CreateCustomer {
    pub fn into_customer(self) -> Result<Customer, InvalidDocument> {
        let name = self.name.unwrap_or_default();
        require_text(&name, "Customer name is required")?;
        let email = self.email.unwrap_or_default();
        require_text(&email, "Email is required")?;

        let now = DateTime::now();
        let customer = Customer {
            id: ObjectId::new(),
            name: trim(name),
            email: normalize_email(&email),
            phone: trim_opt(self.phone),
            address: trim_opt(self.address),
            created_at: now,
            updated_at: now,
        };
        customer.validate_document()?;
        Ok(customer)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomer {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub phone: Patch<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub address: Patch<String>,
}

impl UpdateCustomer {
    /// The new email, if the body sets a non-empty one.
    pub fn email_change(&self) -> Option<String> {
        match &self.email {
            Some(Some(email)) if !email.trim().is_empty() => Some(normalize_email(email)),
            _ => None,
        }
    }

    /// Apply the patch to `customer` and return the stored fields it touched.
    pub fn apply(self, customer: &mut Customer) -> Result<Vec<&'static str>, InvalidDocument> {
        let mut touched = Touched::default();
        touched
            .mark("name", &self.name)
            .mark("email", &self.email)
            .mark("phone", &self.phone)
            .mark("address", &self.address);

        if let Some(name) = self.name {
            customer.name = trim(name.unwrap_or_default());
        }
        if let Some(email) = self.email {
            customer.email = normalize_email(&email.unwrap_or_default());
        }
        if let Some(phone) = self.phone {
            customer.phone = trim_opt(phone);
        }
        if let Some(address) = self.address {
            customer.address = trim_opt(address);
        }
        customer.validate_document()?;

        let mut fields = touched.into_fields();
        if !fields.is_empty() {
            customer.updated_at = DateTime::now();
            fields.push("updatedAt");
        }
        Ok(fields)
    }
}

/// Response shape for a customer. Timestamps are not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerView {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.to_hex(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
        }
    }
}
