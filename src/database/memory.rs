use std::collections::HashMap;

use async_trait::async_trait;
use bson::{Bson, Document};
use tokio::sync::RwLock;

use crate::database::store::{DocumentStore, IndexSpec, StoreError, UpdateDoc, UpdateSummary};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::{Condition, FilterData};

/// In-process store used by the test suite and `DATABASE_BACKEND=memory`.
///
/// Collections are plain vectors in insertion order. Unique indexes are
/// enforced on insert and update; documents missing the indexed field are
/// not checked.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    indexes: Vec<IndexSpec>,
}

impl MemoryStore {
    pub fn new(indexes: Vec<IndexSpec>) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            indexes,
        }
    }

    fn unique_fields<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.indexes
            .iter()
            .filter(move |spec| spec.unique && spec.collection == collection)
            .map(|spec| spec.field)
    }

    /// Fails when `candidate` collides with any document in `existing`
    /// other than the one at `skip`.
    fn check_unique(
        &self,
        collection: &str,
        existing: &[Document],
        candidate: &Document,
        skip: Option<usize>,
    ) -> Result<(), StoreError> {
        for field in self.unique_fields(collection) {
            let value = match candidate.get(field) {
                None | Some(Bson::Null) => continue,
                Some(value) => value,
            };
            let clash = existing
                .iter()
                .enumerate()
                .any(|(i, doc)| Some(i) != skip && doc.get(field) == Some(value));
            if clash {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    message: format!("duplicate key on {}: {}", field, value),
                });
            }
        }
        Ok(())
    }

    fn position(documents: &[Document], condition: &Condition) -> Option<usize> {
        documents.iter().position(|doc| FilterWhere::matches(condition, doc))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut matched: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| FilterWhere::matches(&filter.where_clause, doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &filter.order {
            matched.sort_by(|a, b| FilterOrder::compare(order, a, b));
        }

        let skip = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let take = filter
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(take).collect())
    }

    async fn find_one(&self, collection: &str, condition: &Condition) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|doc| FilterWhere::matches(condition, doc))
                .cloned()
        }))
    }

    async fn count(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| FilterWhere::matches(condition, doc)).count())
            .unwrap_or(0) as u64)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        self.check_unique(collection, docs, &document, None)?;
        docs.push(document);
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let mut inserted = 0;
        for document in documents {
            self.check_unique(collection, docs, &document, None)?;
            docs.push(document);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn update_one(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        let index = match Self::position(docs, condition) {
            Some(index) => index,
            None => return Ok(None),
        };

        let mut updated = docs[index].clone();
        update.apply(&mut updated);
        self.check_unique(collection, docs, &updated, Some(index))?;
        docs[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn update_many(
        &self,
        collection: &str,
        condition: &Condition,
        update: &UpdateDoc,
    ) -> Result<UpdateSummary, StoreError> {
        let mut collections = self.collections.write().await;
        let mut summary = UpdateSummary::default();
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(summary),
        };

        for index in 0..docs.len() {
            if !FilterWhere::matches(condition, &docs[index]) {
                continue;
            }
            summary.matched_count += 1;
            let mut updated = docs[index].clone();
            if update.apply(&mut updated) {
                self.check_unique(collection, docs, &updated, Some(index))?;
                docs[index] = updated;
                summary.modified_count += 1;
            }
        }
        Ok(summary)
    }

    async fn delete_one(&self, collection: &str, condition: &Condition) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        Ok(Self::position(docs, condition).map(|index| docs.remove(index)))
    }

    async fn delete_many(&self, collection: &str, condition: &Condition) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };
        let before = docs.len();
        docs.retain(|doc| !FilterWhere::matches(condition, doc));
        Ok((before - docs.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn store() -> MemoryStore {
        MemoryStore::new(vec![IndexSpec::unique("customers", "email")])
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() {
        let store = store();
        store.insert_one("customers", doc! { "email": "a@x.com" }).await.unwrap();
        let err = store
            .insert_one("customers", doc! { "email": "a@x.com" })
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
        // Missing values are not indexed
        store.insert_one("customers", doc! { "name": "n1" }).await.unwrap();
        store.insert_one("customers", doc! { "name": "n2" }).await.unwrap();
    }

    #[tokio::test]
    async fn insert_many_is_ordered() {
        let store = store();
        let err = store
            .insert_many(
                "customers",
                vec![
                    doc! { "email": "a@x.com" },
                    doc! { "email": "a@x.com" },
                    doc! { "email": "b@x.com" },
                ],
            )
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(store.count("customers", &Condition::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn find_sorts_and_pages() {
        let store = MemoryStore::default();
        for n in [3, 1, 2, 5, 4] {
            store.insert_one("tasks", doc! { "n": n }).await.unwrap();
        }
        let data = crate::filter::Filter::new()
            .order("n", "asc")
            .unwrap()
            .paginate(2, 2)
            .build();
        let docs = store.find("tasks", &data).await.unwrap();
        let ns: Vec<i32> = docs.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, vec![3, 4]);
    }

    #[tokio::test]
    async fn update_one_returns_post_image_and_checks_uniqueness() {
        let store = store();
        store.insert_one("customers", doc! { "email": "a@x.com", "name": "A" }).await.unwrap();
        store.insert_one("customers", doc! { "email": "b@x.com", "name": "B" }).await.unwrap();

        let updated = store
            .update_one(
                "customers",
                &Condition::eq("name", "A"),
                &UpdateDoc::new().set("name", "Alpha"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.get_str("name").unwrap(), "Alpha");

        let err = store
            .update_one(
                "customers",
                &Condition::eq("name", "B"),
                &UpdateDoc::new().set("email", "a@x.com"),
            )
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn update_many_counts_matched_and_modified() {
        let store = MemoryStore::default();
        store.insert_one("tasks", doc! { "status": "pending" }).await.unwrap();
        store.insert_one("tasks", doc! { "status": "completed" }).await.unwrap();

        let summary = store
            .update_many("tasks", &Condition::All, &UpdateDoc::new().set("status", "completed"))
            .await
            .unwrap();
        assert_eq!(summary, UpdateSummary { matched_count: 2, modified_count: 1 });
    }

    #[tokio::test]
    async fn deletes_return_removed_documents() {
        let store = MemoryStore::default();
        store.insert_one("files", doc! { "name": "a" }).await.unwrap();
        store.insert_one("files", doc! { "name": "b" }).await.unwrap();

        let removed = store.delete_one("files", &Condition::eq("name", "a")).await.unwrap();
        assert_eq!(removed, Some(doc! { "name": "a" }));
        assert_eq!(store.delete_one("files", &Condition::eq("name", "a")).await.unwrap(), None);
        assert_eq!(store.delete_many("files", &Condition::All).await.unwrap(), 1);
        assert_eq!(store.delete_many("missing", &Condition::All).await.unwrap(), 0);
    }
}
