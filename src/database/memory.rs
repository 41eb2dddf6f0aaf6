use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, FindQuery, InsertOneResult,
    Projection, StoreResult, UpdateResult,
};

/// In-process store with the same semantics as the MongoDB backend.
/// Documents keep insertion order, which is their natural order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<(DocumentId, Document)>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_id(id: DocumentId, mut doc: Document) -> Document {
        doc.insert("_id".to_string(), Value::String(id.to_hex()));
        doc
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_many(&self, collection: Collection, query: FindQuery) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let skip = query.skip.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(docs
            .iter()
            .filter(|(_, doc)| query.matches(doc))
            .skip(skip)
            .take(limit)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: DocumentId,
        projection: Projection,
    ) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| *doc_id == id))
            .map(|(_, doc)| projection.apply(doc)))
    }

    async fn estimated_count(&self, collection: Collection) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> StoreResult<InsertOneResult> {
        let id = DocumentId::new();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .push((id, Self::with_id(id, doc)));

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id.to_hex(),
        })
    }

    async fn upsert_fields(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Document,
    ) -> StoreResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some((_, doc)) = docs.iter_mut().find(|(doc_id, _)| *doc_id == id) {
            let mut modified = false;
            for (key, value) in fields {
                if doc.get(&key) != Some(&value) {
                    doc.insert(key, value);
                    modified = true;
                }
            }
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        docs.push((id, Self::with_id(id, fields)));
        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id.to_hex()),
        })
    }

    async fn delete_by_id(&self, collection: Collection, id: DocumentId) -> StoreResult<DeleteResult> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(docs) => {
                let before = docs.len();
                docs.retain(|(doc_id, _)| *doc_id != id);
                (before - docs.len()) as u64
            }
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    async fn seed_foods(store: &MemoryStore, n: usize) {
        for i in 0..n {
            store
                .insert_one(Collection::Foods, doc(json!({ "name": format!("food-{}", i) })))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn find_many_slices_in_insertion_order() {
        let store = MemoryStore::new();
        seed_foods(&store, 7).await;

        let page = store
            .find_many(Collection::Foods, FindQuery::all().skip(3).limit(3))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|d| d["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["food-3", "food-4", "food-5"]);

        let tail = store
            .find_many(Collection::Foods, FindQuery::all().skip(6).limit(3))
            .await
            .unwrap();
        assert_eq!(tail.len(), 1);
    }

    #[tokio::test]
    async fn collections_are_separate() {
        let store = MemoryStore::new();
        seed_foods(&store, 2).await;

        assert_eq!(store.estimated_count(Collection::Foods).await.unwrap(), 2);
        assert_eq!(store.estimated_count(Collection::Cart).await.unwrap(), 0);
        assert!(store.find_many(Collection::Cart, FindQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let store = MemoryStore::new();
        let id = DocumentId::new();

        let created = store
            .upsert_fields(Collection::Foods, id, doc(json!({ "name": "Biryani" })))
            .await
            .unwrap();
        assert_eq!(created.upserted_count, 1);
        assert_eq!(created.upserted_id, Some(id.to_hex()));

        let updated = store
            .upsert_fields(Collection::Foods, id, doc(json!({ "price": 9.5 })))
            .await
            .unwrap();
        assert_eq!((updated.matched_count, updated.modified_count), (1, 1));

        let found = store
            .find_by_id(Collection::Foods, id, Projection(&["name", "price"]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(found), json!({ "_id": id.to_hex(), "name": "Biryani", "price": 9.5 }));

        let unchanged = store
            .upsert_fields(Collection::Foods, id, doc(json!({ "price": 9.5 })))
            .await
            .unwrap();
        assert_eq!((unchanged.matched_count, unchanged.modified_count), (1, 0));
    }

    #[tokio::test]
    async fn delete_reports_counts() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_one(Collection::Cart, doc(json!({ "userEmail": "a@b.com" })))
            .await
            .unwrap();
        let id = DocumentId::parse(&inserted.inserted_id).unwrap();

        assert_eq!(store.delete_by_id(Collection::Cart, id).await.unwrap().deleted_count, 1);
        assert_eq!(store.delete_by_id(Collection::Cart, id).await.unwrap().deleted_count, 0);
    }
}
