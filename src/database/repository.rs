use std::marker::PhantomData;
use std::sync::Arc;

use bson::oid::ObjectId;
use bson::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::store::{DocumentStore, StoreError, UpdateDoc, UpdateSummary};
use crate::filter::{Condition, FilterData};

/// A model stored as one document per record in a named collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> ObjectId;
}

pub fn by_id(id: ObjectId) -> Condition {
    Condition::eq("_id", id)
}

/// One page of a filtered listing and the total number of matches.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    fn decode(document: Document) -> Result<T, StoreError> {
        Ok(bson::from_document(document)?)
    }

    fn decode_all(documents: Vec<Document>) -> Result<Vec<T>, StoreError> {
        documents.into_iter().map(Self::decode).collect()
    }

    pub async fn select_any(&self, filter: &FilterData) -> Result<Vec<T>, StoreError> {
        let documents = self.store.find(T::COLLECTION, filter).await?;
        Self::decode_all(documents)
    }

    pub async fn select_page(&self, filter: &FilterData) -> Result<Page<T>, StoreError> {
        let items = self.select_any(filter).await?;
        let total = self.store.count(T::COLLECTION, &filter.where_clause).await?;
        Ok(Page { items, total })
    }

    pub async fn select_one(&self, condition: &Condition) -> Result<Option<T>, StoreError> {
        self.store
            .find_one(T::COLLECTION, condition)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<T>, StoreError> {
        self.select_one(&by_id(id)).await
    }

    pub async fn exists(&self, condition: &Condition) -> Result<bool, StoreError> {
        Ok(self.store.find_one(T::COLLECTION, condition).await?.is_some())
    }

    pub async fn count(&self, condition: &Condition) -> Result<u64, StoreError> {
        self.store.count(T::COLLECTION, condition).await
    }

    pub async fn create(&self, entity: &T) -> Result<(), StoreError> {
        let document = bson::to_document(entity)?;
        self.store.insert_one(T::COLLECTION, document).await
    }

    pub async fn insert_many(&self, entities: &[T]) -> Result<u64, StoreError> {
        let documents = entities
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert_many(T::COLLECTION, documents).await
    }

    /// Write `fields` of `entity` back to its stored document. Fields the
    /// entity no longer carries are removed.
    pub async fn update_fields(&self, entity: &T, fields: &[&str]) -> Result<Option<T>, StoreError> {
        let document = bson::to_document(entity)?;
        let mut update = UpdateDoc::new();
        for field in fields {
            update = match document.get(*field) {
                Some(value) => update.set(field, value.clone()),
                None => update.unset(field),
            };
        }
        self.store
            .update_one(T::COLLECTION, &by_id(entity.id()), &update)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn update_many(&self, condition: &Condition, update: &UpdateDoc) -> Result<UpdateSummary, StoreError> {
        self.store.update_many(T::COLLECTION, condition, update).await
    }

    pub async fn delete_by_id(&self, id: ObjectId) -> Result<Option<T>, StoreError> {
        self.store
            .delete_one(T::COLLECTION, &by_id(id))
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn delete_many(&self, condition: &Condition) -> Result<u64, StoreError> {
        self.store.delete_many(T::COLLECTION, condition).await
    }
}
