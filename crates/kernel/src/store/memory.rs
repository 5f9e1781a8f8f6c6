//! In-memory document store.

use std::path::Path;

use async_trait::async_trait;
use bson::{Bson, Document};
use dashmap::DashMap;

use super::eval::run_pipeline;
use super::{DocumentStore, StoreError};

/// Collections of BSON documents held in process memory.
///
/// Each `aggregate` call evaluates against a snapshot of the collection taken
/// under its shard lock, so all `$facet` branches in one call see the same
/// documents even while other tasks insert concurrently.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document to a collection, creating the collection if needed.
    pub fn insert(&self, collection: &str, document: Document) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Append several documents to a collection.
    pub fn insert_many(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |docs| docs.len())
    }

    /// Number of collections holding at least one insert.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Build a store from a JSON seed file.
    ///
    /// The file holds one object mapping collection names to arrays of
    /// documents in MongoDB extended JSON (`{"$oid": ...}`, `{"$date": ...}`).
    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {e}", path.display())))?;
        Self::from_seed_json(&raw)
    }

    /// Build a store from seed JSON text (see [`MemoryStore::from_seed_file`]).
    pub fn from_seed_json(raw: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| StoreError::Seed(e.to_string()))?;
        let serde_json::Value::Object(collections) = value else {
            return Err(StoreError::Seed(
                "seed data must be an object of collection arrays".to_string(),
            ));
        };

        let store = Self::new();
        for (collection, documents) in collections {
            let serde_json::Value::Array(documents) = documents else {
                return Err(StoreError::Seed(format!(
                    "collection '{collection}' must be an array"
                )));
            };
            let mut parsed = Vec::with_capacity(documents.len());
            for (index, document) in documents.into_iter().enumerate() {
                match Bson::try_from(document) {
                    Ok(Bson::Document(doc)) => parsed.push(doc),
                    Ok(_) => {
                        return Err(StoreError::Seed(format!(
                            "{collection}[{index}] is not a document"
                        )));
                    }
                    Err(e) => {
                        return Err(StoreError::Seed(format!("{collection}[{index}]: {e}")));
                    }
                }
            }
            tracing::debug!(collection = %collection, documents = parsed.len(), "seeded collection");
            store.insert_many(&collection, parsed);
        }
        Ok(store)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let snapshot = self
            .collections
            .get(collection)
            .map(|docs| docs.clone())
            .unwrap_or_default();
        run_pipeline(snapshot, &pipeline)
    }

    async fn health(&self) -> bool {
        true
    }
}
