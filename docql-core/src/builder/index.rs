//! Index create/drop commands.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DocqlError, DocqlResult};
use crate::stage::{SortDirection, SortKey};

/// A named index over ordered keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
    pub name: String,
    pub keys: Vec<SortKey>,
}

impl IndexModel {
    /// Parse `"status ASC, amount DESC"`. Pairs that are not exactly
    /// `field direction` are skipped.
    pub fn parse(name: &str, fields: &str) -> Self {
        let keys = fields
            .split(',')
            .filter_map(|part| match part.split_whitespace().collect::<Vec<_>>()[..] {
                [field, direction] => Some(SortKey {
                    field: field.to_string(),
                    direction: SortDirection::from_keyword(direction),
                }),
                _ => None,
            })
            .collect();

        Self {
            name: name.to_string(),
            keys,
        }
    }

    pub fn keys_document(&self) -> Value {
        let mut keys = Map::new();
        for key in &self.keys {
            keys.insert(key.field.clone(), Value::from(key.direction.as_i32()));
        }
        Value::Object(keys)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIndexCommand {
    pub collection: String,
    pub indexes: Vec<IndexModel>,
}

#[derive(Debug, Clone)]
pub struct CreateIndexBuilder {
    collection: String,
    indexes: Vec<IndexModel>,
}

impl CreateIndexBuilder {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.trim().to_string(),
            indexes: Vec::new(),
        }
    }

    pub fn index(mut self, name: &str, fields: &str) -> Self {
        self.indexes.push(IndexModel::parse(name, fields));
        self
    }

    pub fn build(self) -> DocqlResult<CreateIndexCommand> {
        if self.collection.is_empty() {
            return Err(DocqlError::CollectionNotSpecified);
        }
        Ok(CreateIndexCommand {
            collection: self.collection,
            indexes: self.indexes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropIndexCommand {
    pub collection: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DropIndexBuilder {
    collection: String,
    names: Vec<String>,
}

impl DropIndexBuilder {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.trim().to_string(),
            names: Vec::new(),
        }
    }

    pub fn index(mut self, name: &str) -> Self {
        self.names.push(name.to_string());
        self
    }

    pub fn build(self) -> DocqlResult<DropIndexCommand> {
        if self.collection.is_empty() {
            return Err(DocqlError::CollectionNotSpecified);
        }
        Ok(DropIndexCommand {
            collection: self.collection,
            names: self.names,
        })
    }
}
