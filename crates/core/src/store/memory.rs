use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{ensure_object, CollectionName, DocumentStore, IndexSpec, ReplaceOutcome, StoreError};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Value>,
    indexes: BTreeMap<String, IndexSpec>,
}

/// Process-local store. Nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<CollectionName, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection's documents in insertion order.
    pub async fn documents(&self, collection: &CollectionName) -> Vec<Value> {
        self.collections
            .lock()
            .await
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn replace_all(
        &self,
        collection: &CollectionName,
        documents: Vec<Value>,
    ) -> Result<ReplaceOutcome, StoreError> {
        documents.iter().try_for_each(ensure_object)?;

        let mut collections = self.collections.lock().await;
        let target = collections.entry(collection.clone()).or_default();
        let deleted = target.documents.len() as u64;
        let inserted = documents.len() as u64;
        target.documents = documents;

        Ok(ReplaceOutcome { deleted, inserted })
    }

    async fn insert_one(
        &self,
        collection: &CollectionName,
        document: Value,
    ) -> Result<(), StoreError> {
        ensure_object(&document)?;
        self.collections
            .lock()
            .await
            .entry(collection.clone())
            .or_default()
            .documents
            .push(document);
        Ok(())
    }

    async fn create_index(
        &self,
        collection: &CollectionName,
        index: &IndexSpec,
    ) -> Result<(), StoreError> {
        self.collections
            .lock()
            .await
            .entry(collection.clone())
            .or_default()
            .indexes
            .entry(index.name.clone())
            .or_insert_with(|| index.clone());
        Ok(())
    }

    async fn list_indexes(&self, collection: &CollectionName) -> Result<Vec<String>, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .map(|c| c.indexes.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn count(&self, collection: &CollectionName) -> Result<u64, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .map_or(0, |c| c.documents.len() as u64))
    }

    async fn count_matching(
        &self,
        collection: &CollectionName,
        field: &str,
        value: &Value,
    ) -> Result<u64, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .map_or(0, |c| {
                c.documents
                    .iter()
                    .filter(|doc| doc.get(field) == Some(value))
                    .count() as u64
            }))
    }

    async fn distinct(
        &self,
        collection: &CollectionName,
        field: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.lock().await;
        let Some(c) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut values: Vec<Value> = Vec::new();
        for value in c.documents.iter().filter_map(|doc| doc.get(field)) {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        values.sort_by_cached_key(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        Ok(values)
    }

    async fn find_one(&self, collection: &CollectionName) -> Result<Option<Value>, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .and_then(|c| c.documents.first().cloned()))
    }
}
