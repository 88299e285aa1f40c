//! docql core - storage-independent SQL-like query compiler.
//!
//! This crate turns SQL-like statements and fluent builder calls into an
//! ordered pipeline of document-store stages (`$match`, `$group`, `$sort`,
//! `$skip`, `$limit`, `$project`, `$lookup`). It does no I/O; executing a
//! pipeline is left to a store implementation.
//!
//! # Main Components
//!
//! - **Condition parser**: `price > 100 AND stock > 50` into a predicate tree
//! - **Expression parser**: computed comparisons such as `SUM(amount) > 5000`
//! - **QueryBuilder**: fluent pipeline compiler honoring SQL clause order
//! - **SQL**: clause extraction from a `SELECT` statement
//! - **Write and index builders**: insert/update/delete and index commands
//!
//! # Example
//!
//! ```rust
//! use docql_core::parse_sql;
//! use serde_json::json;
//!
//! let query = parse_sql("SELECT name FROM users WHERE status = 'active' ORDER BY name DESC")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     query.pipeline.to_documents(),
//!     vec![
//!         json!({"$project": {"name": 1}}),
//!         json!({"$match": {"status": {"$eq": "active"}}}),
//!         json!({"$sort": {"name": -1}}),
//!     ]
//! );
//! ```

pub mod aggregation;
pub mod builder;
pub mod condition;
pub mod error;
pub mod expression;
pub mod operators;
pub mod options;
pub mod outcome;
pub mod predicate;
pub mod sql;
pub mod stage;
pub mod value;

// Re-export main types for convenience
pub use aggregation::{resolve_aggregate, split_alias, Accumulator};
pub use builder::{
    CompiledQuery, CreateIndexBuilder, CreateIndexCommand, DeleteBuilder, DeleteCommand,
    DropIndexBuilder, DropIndexCommand, IndexModel, InsertBuilder, InsertCommand, QueryBuilder,
    UpdateBuilder, UpdateCommand,
};
pub use condition::{parse_conditions, ConditionParser};
pub use error::{DocqlError, DocqlResult};
pub use expression::{parse_expression, translate_filter};
pub use operators::{map_operator, Operator};
pub use options::{CompilerOptions, ParseMode};
pub use outcome::Translation;
pub use predicate::{AggregateKind, ExprComparison, Operand, Predicate};
pub use sql::{parse_sql, parse_sql_with};
pub use stage::{Group, Lookup, Pipeline, SortDirection, SortKey, Stage};
pub use value::{coerce, Scalar};
