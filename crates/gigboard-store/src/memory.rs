//! In-memory document store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::document::{DocumentStore, Fields, Filter, StoredDocument};
use crate::error::StoreResult;

/// Process-local store keeping each collection in insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<StoredDocument>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with a caller-chosen id, replacing any existing one.
    pub async fn put(&self, collection: &str, id: &str, fields: Fields) {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.fields = fields,
            None => docs.push(StoredDocument::new(id, fields)),
        }
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<StoredDocument> {
        let doc = StoredDocument::new(Uuid::new_v4().simple().to_string(), fields);
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        debug!(collection, id = %doc.id, "Inserted document");
        Ok(doc)
    }

    async fn find_all(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(&d.fields))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> StoreResult<Option<StoredDocument>> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };

        for (key, value) in patch {
            doc.fields.insert(key, value);
        }
        Ok(Some(doc.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .position(|d| d.id == id)
            .map(|index| docs.remove(index)))
    }
}
