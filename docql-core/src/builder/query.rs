//! Fluent pipeline compiler.
//!
//! Each clause call consumes the builder and returns it with one more stage
//! appended, in call order. The top-level `limit`/`offset` are the exception:
//! they are emitted by [`QueryBuilder::build`], skip first.
//!
//! ```rust
//! use docql_core::{QueryBuilder, Stage};
//!
//! let query = QueryBuilder::new()
//!     .from("orders")
//!     .where_clause("status = 'active'")
//!     .limit(10)
//!     .offset(20)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(query.collection, "orders");
//! assert_eq!(query.pipeline.stages()[1..], [Stage::Skip(20), Stage::Limit(10)]);
//! ```

use serde::Serialize;

use crate::aggregation::resolve_spec;
use crate::error::{DocqlError, DocqlResult};
use crate::expression::translate_filter;
use crate::options::CompilerOptions;
use crate::outcome::Translation;
use crate::predicate::Predicate;
use crate::stage::{Group, Lookup, Pipeline, SortDirection, SortKey, Stage};

/// A finalized query, ready for a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub collection: String,
    pub pipeline: Pipeline,
    /// Filter texts that degraded to an always-true predicate.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

impl CompiledQuery {
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::json!({
            "collection": self.collection,
            "pipeline": self.pipeline.to_documents(),
        })
    }
}

/// Builder for read pipelines. Not meant to be shared; each query is built by
/// a single owner.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    collection: Option<String>,
    fields: Vec<String>,
    group: Option<Group>,
    sort: Option<Vec<SortKey>>,
    limit: u64,
    offset: u64,
    pipeline: Pipeline,
    options: CompilerOptions,
    degraded: Vec<String>,
    error: Option<DocqlError>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> CompilerOptions {
        self.options
    }

    /// Target collection. Required before [`build`](Self::build).
    pub fn from(mut self, collection: &str) -> Self {
        self.collection = Some(collection.trim().to_string());
        self
    }

    /// Append a `$project` of every field selected so far.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.error.is_some() {
            return self;
        }

        let before = self.fields.len();
        self.fields.extend(
            fields
                .into_iter()
                .map(|f| f.as_ref().trim().to_string())
                .filter(|f| !f.is_empty() && f != "*"),
        );

        if self.fields.len() > before {
            self.pipeline.push(Stage::Project(self.fields.clone()));
        }
        self
    }

    /// Filter documents (SQL WHERE).
    pub fn where_clause(self, condition: &str) -> Self {
        self.push_filter(condition)
    }

    /// Filter stage at the current pipeline position.
    pub fn match_clause(self, condition: &str) -> Self {
        self.push_filter(condition)
    }

    /// Filter grouped documents. Call it after `group_by`/`nested_group_by`;
    /// the order is not checked.
    pub fn having(self, condition: &str) -> Self {
        self.push_filter(condition)
    }

    fn push_filter(mut self, condition: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        match translate_filter(condition, self.options.mode) {
            Ok(translation) => {
                let predicate = translation.into_value().unwrap_or(Predicate::Always);
                if predicate.is_degraded() {
                    self.degraded.push(condition.trim().to_string());
                }
                self.pipeline.push(Stage::Match(predicate));
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Simple grouping by one field, replacing the current group.
    pub fn group_by(mut self, field: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        let group = Group::new(field.trim());
        self.group = Some(group.clone());
        self.pipeline.push(Stage::Group(group));
        self
    }

    /// One `$group` keyed by `field` with an accumulator per supported spec
    /// (`SUM(amount) AS total`, `COUNT(*) AS cnt`).
    pub fn nested_group_by<I, S>(mut self, field: &str, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.error.is_some() {
            return self;
        }

        let mut group = Group::new(field.trim());
        for spec in specs {
            match resolve_spec(spec.as_ref()) {
                Translation::Parsed((alias, acc)) | Translation::Fallback((alias, acc)) => {
                    group.insert(alias, acc)
                }
                Translation::Unsupported(reason) => {
                    if self.options.mode.is_strict() {
                        self.error = Some(DocqlError::UnsupportedAggregation(reason));
                        return self;
                    }
                }
            }
        }

        self.pipeline.push(Stage::Group(group));
        self
    }

    /// `field [ASC|DESC]`. Replaces the current sort and appends a `$sort`.
    pub fn order_by(mut self, order: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        let parts: Vec<&str> = order.split_whitespace().collect();
        let keys = match parts.as_slice() {
            [field] => vec![SortKey {
                field: field.to_string(),
                direction: SortDirection::Ascending,
            }],
            [field, direction] => vec![SortKey {
                field: field.to_string(),
                direction: SortDirection::from_keyword(direction),
            }],
            _ if self.options.mode.is_strict() => {
                self.error = Some(DocqlError::InvalidOrderBy(order.trim().to_string()));
                return self;
            }
            _ => Vec::new(),
        };

        self.sort = Some(keys.clone());
        self.pipeline.push(Stage::Sort(keys));
        self
    }

    /// Maximum number of documents, emitted at build time.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = n;
        self
    }

    /// Documents to skip, emitted at build time before the limit.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = n;
        self
    }

    /// Append a `$limit` right now, if `n > 0`.
    pub fn aggregation_limit(mut self, n: u64) -> Self {
        if n > 0 && self.error.is_none() {
            self.pipeline.push(Stage::Limit(n));
        }
        self
    }

    /// Append a `$skip` right now, if `n > 0`.
    pub fn aggregation_offset(mut self, n: u64) -> Self {
        if n > 0 && self.error.is_none() {
            self.pipeline.push(Stage::Skip(n));
        }
        self
    }

    /// Append a `$lookup`. The foreign collection is not checked.
    pub fn join(mut self, local_field: &str, from: &str, foreign_field: &str, as_field: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        self.pipeline.push(Stage::Lookup(Lookup {
            local_field: local_field.to_string(),
            from: from.to_string(),
            foreign_field: foreign_field.to_string(),
            as_field: as_field.to_string(),
        }));
        self
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Stages appended so far, without the deferred skip/limit.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn current_group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn current_sort(&self) -> Option<&[SortKey]> {
        self.sort.as_deref()
    }

    pub fn limit_value(&self) -> u64 {
        self.limit
    }

    pub fn offset_value(&self) -> u64 {
        self.offset
    }

    /// Finalize: check the collection, then append skip and limit.
    pub fn build(self) -> DocqlResult<CompiledQuery> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let collection = match self.collection {
            Some(c) if !c.is_empty() => c,
            _ => return Err(DocqlError::CollectionNotSpecified),
        };

        let mut pipeline = self.pipeline;
        if self.offset > 0 {
            pipeline.push(Stage::Skip(self.offset));
        }
        if self.limit > 0 {
            pipeline.push(Stage::Limit(self.limit));
        }

        Ok(CompiledQuery {
            collection,
            pipeline,
            degraded: self.degraded,
        })
    }
}
