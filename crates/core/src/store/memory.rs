//! In-process document store.
//!
//! Documents are kept per collection in insertion order, so listing is stable across calls.
//! Every connection shares the same underlying data; closing a connection releases nothing but
//! the handle itself.

use super::{parse_object_id, Collection, StoreConnector, StoreHandle};
use crate::CatalogResult;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Collections = HashMap<Collection, Vec<Document>>;

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreConnector for MemoryStore {
    async fn connect(&self) -> CatalogResult<Box<dyn StoreHandle>> {
        Ok(Box::new(MemoryHandle {
            collections: Arc::clone(&self.collections),
        }))
    }
}

struct MemoryHandle {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryHandle {
    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn has_id(document: &Document, oid: &ObjectId) -> bool {
    document.get_object_id("_id").is_ok_and(|id| id == *oid)
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    async fn find_all(&self, collection: Collection) -> CatalogResult<Vec<Document>> {
        Ok(self.lock().get(&collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> CatalogResult<Option<Document>> {
        let Ok(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        Ok(self
            .lock()
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| has_id(d, &oid)).cloned()))
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> CatalogResult<String> {
        let oid = match document.get("_id") {
            Some(Bson::ObjectId(oid)) => *oid,
            _ => ObjectId::new(),
        };

        let mut stored = Document::new();
        stored.insert("_id", oid);
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }

        self.lock().entry(collection).or_default().push(stored);
        Ok(oid.to_hex())
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        changes: Document,
    ) -> CatalogResult<u64> {
        let oid = parse_object_id(id)?;
        let mut collections = self.lock();
        let Some(document) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| has_id(d, &oid)))
        else {
            return Ok(0);
        };

        let mut modified = false;
        for (key, value) in changes {
            if document.get(&key) != Some(&value) {
                document.insert(key, value);
                modified = true;
            }
        }
        Ok(u64::from(modified))
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> CatalogResult<u64> {
        let oid = parse_object_id(id)?;
        let mut collections = self.lock();
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|d| !has_id(d, &oid));
        Ok((before - docs.len()) as u64)
    }

    async fn close(self: Box<Self>) {
        tracing::trace!("released in-memory store handle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogError;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_id_and_preserves_order() {
        let store = MemoryStore::new();
        let handle = store.connect().await.expect("memory connect never fails");

        let first = handle
            .insert_one(Collection::Ingredients, doc! { "name": "Provolone" })
            .await
            .expect("insert");
        let second = handle
            .insert_one(Collection::Ingredients, doc! { "name": "Ham" })
            .await
            .expect("insert");
        assert_ne!(first, second);

        let docs = handle
            .find_all(Collection::Ingredients)
            .await
            .expect("find_all");
        let names: Vec<_> = docs
            .iter()
            .map(|d| d.get_str("name").expect("name"))
            .collect();
        assert_eq!(names, ["Provolone", "Ham"]);
        assert_eq!(
            docs[0].get_object_id("_id").expect("id").to_hex(),
            first
        );

        assert!(handle
            .find_all(Collection::Sandwiches)
            .await
            .expect("find_all")
            .is_empty());
        handle.close().await;
    }

    #[tokio::test]
    async fn test_connections_share_data() {
        let store = MemoryStore::new();

        let writer = store.connect().await.expect("connect");
        let id = writer
            .insert_one(Collection::Sandwiches, doc! { "name": "Cuban" })
            .await
            .expect("insert");
        writer.close().await;

        let reader = store.connect().await.expect("connect");
        let found = reader
            .find_by_id(Collection::Sandwiches, &id)
            .await
            .expect("find_by_id")
            .expect("document should exist");
        assert_eq!(found.get_str("name").expect("name"), "Cuban");
        reader.close().await;
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        let handle = store.connect().await.expect("connect");
        let id = handle
            .insert_one(
                Collection::Ingredients,
                doc! { "name": "Rye", "is_available": true },
            )
            .await
            .expect("insert");

        let modified = handle
            .update_by_id(Collection::Ingredients, &id, doc! { "is_available": false })
            .await
            .expect("update");
        assert_eq!(modified, 1);

        let unchanged = handle
            .update_by_id(Collection::Ingredients, &id, doc! { "is_available": false })
            .await
            .expect("update");
        assert_eq!(unchanged, 0);

        assert_eq!(
            handle
                .delete_by_id(Collection::Ingredients, &id)
                .await
                .expect("delete"),
            1
        );
        assert!(handle
            .find_by_id(Collection::Ingredients, &id)
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn test_malformed_ids() {
        let store = MemoryStore::new();
        let handle = store.connect().await.expect("connect");

        assert!(handle
            .find_by_id(Collection::Ingredients, "xyz")
            .await
            .expect("lookup of a malformed id is not an error")
            .is_none());
        assert!(matches!(
            handle.delete_by_id(Collection::Ingredients, "xyz").await,
            Err(CatalogError::InvalidId(_))
        ));
    }
}
