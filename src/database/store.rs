use async_trait::async_trait;
use bson::{Bson, Document};
use thiserror::Error;

use crate::filter::{Condition, FilterData};

/// Errors surfaced by a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key in {collection}: {message}")]
    DuplicateKey { collection: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Backend(String),

    #[error("Missing configuration: {0}")]
    Config(String),
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

/// A `$set`/`$unset` pair applied to matched documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDoc {
    pub set: Document,
    pub unset: Vec<String>,
}

impl UpdateDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.set.insert(field, value.into());
        self
    }

    pub fn unset(mut self, field: &str) -> Self {
        self.unset.push(field.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    pub fn to_document(&self) -> Document {
        let mut update = Document::new();
        if !self.set.is_empty() {
            update.insert("$set", self.set.clone());
        }
        if !self.unset.is_empty() {
            let fields: Document = self
                .unset
                .iter()
                .map(|f| (f.clone(), Bson::String(String::new())))
                .collect();
            update.insert("$unset", fields);
        }
        update
    }

    /// Apply the update in place, returning whether any value changed.
    pub fn apply(&self, document: &mut Document) -> bool {
        let mut changed = false;
        for (key, value) in &self.set {
            if document.get(key) != Some(value) {
                document.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        for key in &self.unset {
            changed |= document.remove(key).is_some();
        }
        changed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Index declared by a model and ensured when the store is first used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub field: &'static str,
    pub descending: bool,
    pub unique: bool,
}

impl IndexSpec {
    pub const fn unique(collection: &'static str, field: &'static str) -> Self {
        Self { collection, field, descending: false, unique: true }
    }

    pub const fn asc(collection: &'static str, field: &'static str) -> Self {
        Self { collection, field, descending: false, unique: false }
    }

    pub const fn desc(collection: &'static str, field: &'static str) -> Self {
        Self { collection, field, descending: true, unique: false }
    }
}

/// Single-collection operations the API needs from its backing store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn find(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        condition: &Condition,
    ) -> Result<Option<Document>, StoreError>;

    async fn count(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Ordered insert; stops at the first failure.
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<u64, StoreError>;

    /// Updates the first match and returns it as it reads after the update.
    async fn update_one(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<Option<Document>, StoreError>;

    async fn update_many(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<UpdateSummary, StoreError>;

    /// Deletes the first match and returns it.
    async fn delete_one(
        &self,
        collection: &str,
        condition: &Condition,
    ) -> Result<Option<Document>, StoreError>;

    async fn delete_many(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError>;
}
