use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{
    FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument,
};
use mongodb::{Client, Collection, Database, IndexModel};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::database::store::{DocumentStore, IndexSpec, StoreError, UpdateDoc, UpdateSummary};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::{Condition, FilterData};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed store. The client connects on first use and is reused
/// for the life of the process.
pub struct DatabaseManager {
    uri: String,
    database_name: String,
    indexes: Vec<IndexSpec>,
    database: OnceCell<Database>,
}

impl DatabaseManager {
    pub fn new(uri: impl Into<String>, database_name: impl Into<String>, indexes: Vec<IndexSpec>) -> Self {
        Self {
            uri: uri.into(),
            database_name: database_name.into(),
            indexes,
            database: OnceCell::new(),
        }
    }

    /// Connect if not already connected.
    async fn database(&self) -> Result<&Database, StoreError> {
        self.database
            .get_or_try_init(|| async {
                if self.uri.is_empty() {
                    return Err(StoreError::Config("MONGODB_URI".to_string()));
                }
                let client = Client::with_uri_str(&self.uri)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                let database = client.database(&self.database_name);
                Self::ensure_indexes(&database, &self.indexes).await?;
                info!("Connected to MongoDB database: {}", self.database_name);
                Ok(database)
            })
            .await
    }

    async fn ensure_indexes(database: &Database, indexes: &[IndexSpec]) -> Result<(), StoreError> {
        for spec in indexes {
            let order = if spec.descending { -1 } else { 1 };
            let model = IndexModel::builder()
                .keys(doc! { spec.field: order })
                .options(IndexOptions::builder().unique(spec.unique).build())
                .build();
            database
                .collection::<Document>(spec.collection)
                .create_index(model, None)
                .await
                .map_err(|e| Self::map_error(spec.collection, e))?;
        }
        Ok(())
    }

    async fn collection(&self, name: &str) -> Result<Collection<Document>, StoreError> {
        Ok(self.database().await?.collection::<Document>(name))
    }

    fn map_error(collection: &str, err: MongoError) -> StoreError {
        if Self::is_duplicate_key(&err) {
            warn!("Duplicate key rejected by {}: {}", collection, err);
            return StoreError::DuplicateKey {
                collection: collection.to_string(),
                message: err.to_string(),
            };
        }
        StoreError::Backend(err.to_string())
    }

    fn is_duplicate_key(err: &MongoError) -> bool {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
            ErrorKind::BulkWrite(failure) => failure
                .write_errors
                .as_ref()
                .map(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY_CODE))
                .unwrap_or(false),
            ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
            _ => false,
        }
    }
}

#[async_trait]
impl DocumentStore for DatabaseManager {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database()
            .await?
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder()
            .sort(filter.order.as_ref().map(FilterOrder::to_document))
            .skip(Some(filter.offset).filter(|offset| *offset > 0))
            .limit(filter.limit.map(|limit| limit as i64))
            .build();
        let cursor = self
            .collection(collection)
            .await?
            .find(FilterWhere::to_document(&filter.where_clause), options)
            .await
            .map_err(|e| Self::map_error(collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| Self::map_error(collection, e))
    }

    async fn find_one(&self, collection: &str, condition: &Condition) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .await?
            .find_one(FilterWhere::to_document(condition), None)
            .await
            .map_err(|e| Self::map_error(collection, e))
    }

    async fn count(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError> {
        self.collection(collection)
            .await?
            .count_documents(FilterWhere::to_document(condition), None)
            .await
            .map_err(|e| Self::map_error(collection, e))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.collection(collection)
            .await?
            .insert_one(document, None)
            .await
            .map_err(|e| Self::map_error(collection, e))?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<u64, StoreError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection(collection)
            .await?
            .insert_many(documents, None)
            .await
            .map_err(|e| Self::map_error(collection, e))?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn update_one(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<Option<Document>, StoreError> {
        if update.is_empty() {
            return self.find_one(collection, condition).await;
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.collection(collection)
            .await?
            .find_one_and_update(FilterWhere::to_document(condition), update.to_document(), options)
            .await
            .map_err(|e| Self::map_error(collection, e))
    }

    async fn update_many(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<UpdateSummary, StoreError> {
        if update.is_empty() {
            let matched_count = self.count(collection, condition).await?;
            return Ok(UpdateSummary { matched_count, modified_count: 0 });
        }
        let result = self
            .collection(collection)
            .await?
            .update_many(FilterWhere::to_document(condition), update.to_document(), None)
            .await
            .map_err(|e| Self::map_error(collection, e))?;
        Ok(UpdateSummary {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, condition: &Condition) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .await?
            .find_one_and_delete(FilterWhere::to_document(condition), None)
            .await
            .map_err(|e| Self::map_error(collection, e))
    }

    async fn delete_many(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .await?
            .delete_many(FilterWhere::to_document(condition), None)
            .await
            .map_err(|e| Self::map_error(collection, e))?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_uri_is_a_config_error() {
        let manager = DatabaseManager::new("", "buildpro", vec![]);
        let err = manager.ping().await.unwrap_err();
        assert!(matches!(err, StoreError::Config(ref name) if name == "MONGODB_URI"));
        assert_eq!(manager.backend_name(), "mongodb");
    }
}
