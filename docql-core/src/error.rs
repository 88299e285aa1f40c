//! Error types for docql-core.
//!
//! Minimal error types without execution dependencies (no tokio, no store).

use thiserror::Error;

/// Compilation error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocqlError {
    #[error("Collection is not specified")]
    CollectionNotSpecified,

    #[error("Number of values ({found}) must match the number of fields ({expected})")]
    FieldCountMismatch { expected: usize, found: usize },

    #[error("No documents to insert")]
    NoDocuments,

    #[error("Invalid expression format: {0}")]
    NotAnExpression(String),

    #[error("Unsupported operator in expression: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Unsupported aggregation function: {0}")]
    UnsupportedAggregation(String),

    #[error("Invalid ORDER BY: {0}")]
    InvalidOrderBy(String),

    #[error("Statement must start with SELECT")]
    ExpectedSelect,

    #[error("Clause {0} appears more than once")]
    DuplicateClause(String),

    #[error("Clause {clause} must not follow {after}")]
    ClauseOutOfOrder { clause: String, after: String },

    #[error("Invalid LIMIT value: {0}")]
    InvalidLimit(String),

    #[error("Invalid OFFSET value: {0}")]
    InvalidOffset(String),
}

/// Result type for docql compilation
pub type DocqlResult<T> = Result<T, DocqlError>;

impl serde::Serialize for DocqlError {
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

    #[test]
    fn test_error_messages() {
        let err = DocqlError::CollectionNotSpecified;
        assert_eq!(err.to_string(), "Collection is not specified");

        let err = DocqlError::FieldCountMismatch {
            expected: 2,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "Number of values (3) must match the number of fields (2)"
        );

        let err = DocqlError::UnsupportedAggregation("AVG(price)".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported aggregation function: AVG(price)"
        );

        let err = DocqlError::ClauseOutOfOrder {
            clause: "WHERE".to_string(),
            after: "ORDER BY".to_string(),
        };
        assert_eq!(err.to_string(), "Clause WHERE must not follow ORDER BY");

        let err = DocqlError::InvalidLimit("ten".to_string());
        assert_eq!(err.to_string(), "Invalid LIMIT value: ten");
    }

    #[test]
    fn test_error_serializes_as_message() {
        let err = DocqlError::DuplicateClause("WHERE".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!("Clause WHERE appears more than once"));
    }

    #[test]
    fn test_result_type() {
        let ok_result: DocqlResult<i32> = Ok(42);
        assert_eq!(ok_result.unwrap(), 42);

        let err_result: DocqlResult<i32> = Err(DocqlError::NoDocuments);
        assert!(err_result.is_err());
    }
}
