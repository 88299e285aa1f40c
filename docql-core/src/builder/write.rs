//! Insert, update and delete commands.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::condition::parse_conditions;
use crate::error::{DocqlError, DocqlResult};
use crate::predicate::Predicate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertCommand {
    pub collection: String,
    pub documents: Vec<Value>,
}

/// Builds documents from a field list and rows of values.
#[derive(Debug, Clone, Default)]
pub struct InsertBuilder {
    collection: String,
    fields: Vec<String>,
    rows: Vec<Vec<Value>>,
    error: Option<DocqlError>,
}

impl InsertBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_into<I, S>(mut self, collection: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.collection = collection.trim().to_string();
        self.fields = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Add one row. Its length must match the field list.
    pub fn values(mut self, row: Vec<Value>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if row.len() != self.fields.len() {
            self.error = Some(DocqlError::FieldCountMismatch {
                expected: self.fields.len(),
                found: row.len(),
            });
            return self;
        }
        self.rows.push(row);
        self
    }

    pub fn build(self) -> DocqlResult<InsertCommand> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.collection.is_empty() {
            return Err(DocqlError::CollectionNotSpecified);
        }
        if self.rows.is_empty() {
            return Err(DocqlError::NoDocuments);
        }

        let documents = self
            .rows
            .into_iter()
            .map(|row| {
                let doc: Map<String, Value> = self.fields.iter().cloned().zip(row).collect();
                Value::Object(doc)
            })
            .collect();

        Ok(InsertCommand {
            collection: self.collection,
            documents,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateCommand {
    pub collection: String,
    pub filter: Predicate,
    pub changes: Map<String, Value>,
    pub multi: bool,
}

impl UpdateCommand {
    /// Store-native update document: `{"$set": {..}}`.
    pub fn update_document(&self) -> Value {
        serde_json::json!({ "$set": self.changes })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    collection: String,
    changes: Map<String, Value>,
    filter: Predicate,
    multi: bool,
}

impl UpdateBuilder {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.trim().to_string(),
            changes: Map::new(),
            filter: Predicate::Always,
            multi: false,
        }
    }

    /// Fields to set. Later calls replace earlier ones.
    pub fn set(mut self, changes: Map<String, Value>) -> Self {
        self.changes = changes;
        self
    }

    /// Filter using the condition parser.
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.filter = parse_conditions(condition);
        self
    }

    /// Update every matching document instead of the first one.
    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn build(self) -> DocqlResult<UpdateCommand> {
        if self.collection.is_empty() {
            return Err(DocqlError::CollectionNotSpecified);
        }
        Ok(UpdateCommand {
            collection: self.collection,
            filter: self.filter,
            changes: self.changes,
            multi: self.multi,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteCommand {
    pub collection: String,
    pub filter: Predicate,
    pub multi: bool,
}

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    collection: String,
    filter: Predicate,
    multi: bool,
}

impl DeleteBuilder {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.trim().to_string(),
            filter: Predicate::Always,
            multi: false,
        }
    }

    pub fn where_clause(mut self, condition: &str) -> Self {
        self.filter = parse_conditions(condition);
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn build(self) -> DocqlResult<DeleteCommand> {
        if self.collection.is_empty() {
            return Err(DocqlError::CollectionNotSpecified);
        }
        Ok(DeleteCommand {
            collection: self.collection,
            filter: self.filter,
            multi: self.multi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Operator;
    use serde_json::json;

    #[test]
    fn test_insert_builds_documents() {
        let cmd = InsertBuilder::new()
            .insert_into("orders", ["item", "qty"])
            .values(vec![json!("pen"), json!(3)])
            .values(vec![json!("ink"), json!(1)])
            .build()
            .unwrap();

        assert_eq!(cmd.collection, "orders");
        assert_eq!(
            cmd.documents,
            vec![json!({"item": "pen", "qty": 3}), json!({"item": "ink", "qty": 1})]
        );
    }

    #[test]
    fn test_insert_field_count_mismatch() {
        let err = InsertBuilder::new()
            .insert_into("orders", ["item", "qty"])
            .values(vec![json!("pen")])
            .values(vec![json!("ink"), json!(1)])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DocqlError::FieldCountMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_insert_requires_collection_and_rows() {
        assert_eq!(
            InsertBuilder::new().values(vec![]).build().unwrap_err(),
            DocqlError::CollectionNotSpecified
        );
        assert_eq!(
            InsertBuilder::new()
                .insert_into("orders", ["a"])
                .build()
                .unwrap_err(),
            DocqlError::NoDocuments
        );
    }

    #[test]
    fn test_update_command() {
        let mut changes = Map::new();
        changes.insert("status".into(), json!("shipped"));

        let cmd = UpdateBuilder::new("orders")
            .set(changes)
            .where_clause("qty > 2")
            .multi(true)
            .build()
            .unwrap();

        assert_eq!(cmd.filter, Predicate::comparison("qty", Operator::Gt, 2));
        assert!(cmd.multi);
        assert_eq!(cmd.update_document(), json!({"$set": {"status": "shipped"}}));
    }

    #[test]
    fn test_delete_command_defaults() {
        let cmd = DeleteBuilder::new("orders").build().unwrap();
        assert_eq!(cmd.filter, Predicate::Always);
        assert!(!cmd.multi);

        assert_eq!(
            DeleteBuilder::new(" ").build().unwrap_err(),
            DocqlError::CollectionNotSpecified
        );
    }
}
