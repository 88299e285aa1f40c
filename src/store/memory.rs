use std::collections::HashMap;

use async_trait::async_trait;
use docql_core::{IndexModel, Pipeline, Predicate};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::eval::{apply_stage, matches, set_field_value};
use super::{Store, StoreError, StoreResult, WriteSummary};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Value>,
    indexes: Vec<IndexModel>,
}

/// In-process store. Collections are created on first write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `{"collection": [documents..], ..}`.
    ///
    /// Documents keep their `_id` when present; others get a generated one.
    pub fn from_json(data: Value) -> StoreResult<Self> {
        let Value::Object(collections) = data else {
            return Err(StoreError::InvalidDocument(
                "expected an object of collections".to_string(),
            ));
        };

        let store = Self::new();
        for (name, docs) in collections {
            let Value::Array(docs) = docs else {
                return Err(StoreError::InvalidDocument(format!(
                    "collection '{}' must be an array",
                    name
                )));
            };
            store.add_collection(&name, docs)?;
        }
        Ok(store)
    }

    /// Add documents to a collection, creating it if needed.
    pub fn add_collection(&self, name: &str, docs: Vec<Value>) -> StoreResult<()> {
        let docs = docs
            .into_iter()
            .map(|doc| with_id(doc).map(|(doc, _)| doc))
            .collect::<StoreResult<Vec<_>>>()?;

        self.collections
            .write()
            .entry(name.to_string())
            .or_default()
            .documents
            .extend(docs);
        Ok(())
    }

    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Documents of a collection in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    pub fn indexes(&self, collection: &str) -> Vec<IndexModel> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default()
    }
}

/// Ensure `doc` is an object with an `_id`, returning the id.
fn with_id(doc: Value) -> StoreResult<(Value, Value)> {
    let Value::Object(mut map) = doc else {
        return Err(StoreError::InvalidDocument(
            "document must be a JSON object".to_string(),
        ));
    };
    let id = map
        .entry("_id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
        .clone();
    Ok((Value::Object(map), id))
}

#[async_trait]
impl Store for MemoryStore {
    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read();
        let foreign = |name: &str| {
            collections
                .get(name)
                .map(|c| c.documents.clone())
                .unwrap_or_default()
        };

        let mut docs = foreign(collection);
        for stage in pipeline {
            docs = apply_stage(docs, stage, foreign);
        }
        Ok(docs)
    }

    async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<Value> {
        let (document, id) = with_id(document)?;
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .documents
            .push(document);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Predicate,
        changes: &Map<String, Value>,
        multi: bool,
    ) -> StoreResult<WriteSummary> {
        let mut collections = self.collections.write();
        let mut summary = WriteSummary::default();
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(summary);
        };

        for doc in coll.documents.iter_mut().filter(|d| matches(d, filter)) {
            summary.matched += 1;
            if let Value::Object(map) = doc {
                let before = map.clone();
                for (field, value) in changes {
                    set_field_value(map, field, value.clone());
                }
                if *map != before {
                    summary.modified += 1;
                }
            }
            if !multi {
                break;
            }
        }
        Ok(summary)
    }

    async fn delete(&self, collection: &str, filter: &Predicate, multi: bool) -> StoreResult<WriteSummary> {
        let mut collections = self.collections.write();
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(WriteSummary::default());
        };

        let mut removed = 0u64;
        coll.documents.retain(|doc| {
            if (multi || removed == 0) && matches(doc, filter) {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(WriteSummary {
            matched: removed,
            modified: removed,
        })
    }

    async fn create_index(&self, collection: &str, index: &IndexModel) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let coll = collections.entry(collection.to_string()).or_default();
        if coll.indexes.iter().any(|i| i.name == index.name) {
            return Err(StoreError::IndexExists(index.name.clone()));
        }
        coll.indexes.push(index.clone());
        Ok(())
    }

    async fn drop_index(&self, collection: &str, name: &str) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::IndexNotFound(name.to_string()))?;
        let before = coll.indexes.len();
        coll.indexes.retain(|i| i.name != name);
        if coll.indexes.len() == before {
            return Err(StoreError::IndexNotFound(name.to_string()));
        }
        Ok(())
    }
}
