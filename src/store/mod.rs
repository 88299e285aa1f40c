//! Execution collaborators.
//!
//! A [`Store`] runs compiled pipelines and write commands against a backing
//! document store. [`MemoryStore`] keeps collections in process memory.

mod eval;
mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use docql_core::{IndexModel, Pipeline, Predicate};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Index '{0}' already exists")]
    IndexExists(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of an update or delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct WriteSummary {
    pub matched: u64,
    pub modified: u64,
}

/// Backend that executes pipelines and write commands.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run `pipeline` over `collection` and return the resulting documents.
    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> StoreResult<Vec<Value>>;

    /// Insert one document and return its `_id`.
    async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<Value>;

    /// Insert documents in order and return their `_id`s.
    async fn insert_many(&self, collection: &str, documents: Vec<Value>) -> StoreResult<Vec<Value>> {
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(self.insert_one(collection, document).await?);
        }
        Ok(ids)
    }

    /// Set `changes` on the first matching document, or all of them when `multi`.
    async fn update(
        &self,
        collection: &str,
        filter: &Predicate,
        changes: &Map<String, Value>,
        multi: bool,
    ) -> StoreResult<WriteSummary>;

    async fn delete(&self, collection: &str, filter: &Predicate, multi: bool) -> StoreResult<WriteSummary>;

    async fn create_index(&self, collection: &str, index: &IndexModel) -> StoreResult<()>;

    async fn drop_index(&self, collection: &str, name: &str) -> StoreResult<()>;
}
