use std::fmt;

use docql_core::DocqlError;
use thiserror::Error;

use crate::store::StoreError;

/// Kind of store call, used for error context and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Aggregate,
    Insert,
    Update,
    Delete,
    CreateIndex,
    DropIndex,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Aggregate => "aggregate",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::CreateIndex => "create_index",
            Operation::DropIndex => "drop_index",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Query error: {0}")]
    Query(#[from] DocqlError),

    #[error("Failed to {operation} on '{collection}': {source}")]
    Execution {
        operation: Operation,
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("{operation} on '{collection}' timed out after {timeout_ms}ms")]
    Timeout {
        operation: Operation,
        collection: String,
        timeout_ms: u64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn execution(operation: Operation, collection: &str, source: StoreError) -> Self {
        DbError::Execution {
            operation,
            collection: collection.to_string(),
            source,
        }
    }
}

impl serde::Serialize for DbError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_messages() {
        let err = DbError::from(DocqlError::CollectionNotSpecified);
        assert_eq!(err.to_string(), "Query error: Collection is not specified");

        let err = DbError::execution(
            Operation::DropIndex,
            "orders",
            StoreError::IndexNotFound("by_status".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Failed to drop_index on 'orders': Index 'by_status' not found"
        );
        assert!(err.source().is_some());

        let err = DbError::Timeout {
            operation: Operation::Aggregate,
            collection: "orders".to_string(),
            timeout_ms: 10,
        };
        assert_eq!(err.to_string(), "aggregate on 'orders' timed out after 10ms");
    }

    #[test]
    fn test_error_serializes_as_message() {
        let err = DbError::Config("bad parse_mode".to_string());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!("Configuration error: bad parse_mode")
        );
    }
}
