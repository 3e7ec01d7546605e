mod common;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use reqwest::StatusCode;
use serde_json::json;

use buildpro_api::database::models::indexes;
use buildpro_api::database::models::project::project_number;
use buildpro_api::database::{DocumentStore, MemoryStore, StoreError, UpdateDoc, UpdateSummary};
use buildpro_api::filter::{Condition, FilterData};
use buildpro_api::state::AppState;

use common::error_of;

/// Memory store whose lookups never see the unique fields, so every
/// uniqueness decision falls through to the index on write.
struct StaleReads {
    inner: MemoryStore,
}

fn mentions_unique_field(condition: &Condition) -> bool {
    match condition {
        Condition::Eq { column, .. } | Condition::Ne { column, .. } | Condition::In { column, .. } => {
            column == "email" || column == "projectNumber"
        }
        Condition::And(parts) | Condition::Or(parts) => parts.iter().any(mentions_unique_field),
        _ => false,
    }
}

#[async_trait]
impl DocumentStore for StaleReads {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn find(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, StoreError> {
        self.inner.find(collection, filter).await
    }

    async fn find_one(&self, collection: &str, condition: &Condition) -> Result<Option<Document>, StoreError> {
        if mentions_unique_field(condition) {
            return Ok(None);
        }
        self.inner.find_one(collection, condition).await
    }

    async fn count(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError> {
        self.inner.count(collection, condition).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.inner.insert_one(collection, document).await
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<u64, StoreError> {
        self.inner.insert_many(collection, documents).await
    }

    async fn update_one(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<Option<Document>, StoreError> {
        self.inner.update_one(collection, condition, update).await
    }

    async fn update_many(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<UpdateSummary, StoreError> {
        self.inner.update_many(collection, condition, update).await
    }

    async fn delete_one(
        &self,
        collection: &str,
        condition: &Condition,
    ) -> Result<Option<Document>, StoreError> {
        self.inner.delete_one(collection, condition).await
    }

    async fn delete_many(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError> {
        self.inner.delete_many(collection, condition).await
    }
}

async fn spawn_stale() -> Result<common::TestServer> {
    let uploads = tempfile::tempdir().context("failed to create uploads dir")?;
    let store = StaleReads { inner: MemoryStore::new(indexes()) };
    let state = AppState::new(Arc::new(store), common::test_config(uploads.path()));
    common::spawn_state(state, uploads).await
}

#[tokio::test]
async fn customer_email_index_reports_friendly_message_on_create() -> Result<()> {
    let server = spawn_stale().await?;
    server
        .create("/api/customers", &json!({ "name": "Jane Doe", "email": "jane@x.com" }))
        .await?;

    let (status, body) = server
        .post_json("/api/customers", &json!({ "name": "Jane Again", "email": "JANE@x.com" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(error_of(&body), "A customer with this email already exists");
    Ok(())
}

#[tokio::test]
async fn customer_email_index_reports_friendly_message_on_update() -> Result<()> {
    let server = spawn_stale().await?;
    server
        .create("/api/customers", &json!({ "name": "Jane Doe", "email": "jane@x.com" }))
        .await?;
    let john = server
        .create("/api/customers", &json!({ "name": "John Roe", "email": "john@x.com" }))
        .await?;

    let (status, body) = server
        .put_json(&format!("/api/customers/{}", john), &json!({ "email": "jane@x.com" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(error_of(&body), "A customer with this email already exists");

    let (_, body) = server.get(&format!("/api/customers/{}", john)).await?;
    assert_eq!(body["data"]["email"], "john@x.com");
    Ok(())
}

#[tokio::test]
async fn project_number_index_reports_friendly_message() -> Result<()> {
    let server = spawn_stale().await?;

    // Occupy every number the allocator can pick over the next few seconds.
    let now = chrono::Utc::now().timestamp_millis();
    let taken: Vec<Document> = (0..3_000)
        .map(|offset| doc! { "_id": ObjectId::new(), "projectNumber": project_number(now, offset) })
        .collect();
    server.state.store.insert_many("projects", taken).await?;

    let (status, body) = server
        .post_json("/api/projects", &json!({ "name": "P", "customer": "C", "projectType": "Commercial" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(error_of(&body), "A project with this project number already exists");
    Ok(())
}
