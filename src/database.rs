//! Execution facade: finalizes builders and runs them on a [`Store`].
//!
//! Every store call is bounded by the configured timeout and never retried.
//! Store failures come back as [`DbError::Execution`] naming the operation and
//! collection.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use docql_core::{
    parse_sql_with, CompiledQuery, CompilerOptions, CreateIndexBuilder, DeleteBuilder,
    DropIndexBuilder, InsertBuilder, QueryBuilder, UpdateBuilder,
};
use serde_json::Value;

use crate::config::Config;
use crate::error::{DbError, DbResult, Operation};
use crate::store::{Store, StoreResult, WriteSummary};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Database<S: Store> {
    name: String,
    store: Arc<S>,
    options: CompilerOptions,
    timeout: Duration,
}

impl<S: Store> Clone for Database<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            options: self.options,
            timeout: self.timeout,
        }
    }
}

impl<S: Store> Database<S> {
    pub fn new(name: &str, store: S) -> Self {
        Self {
            name: name.to_string(),
            store: Arc::new(store),
            options: CompilerOptions::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Database named, timed and parsed per `config`.
    pub fn from_config(config: &Config, store: S) -> Self {
        Self::new(&config.database, store)
            .with_options(config.compiler_options())
            .with_timeout(config.timeout())
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> CompilerOptions {
        self.options
    }

    /// A query builder using this database's parse mode.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::with_options(self.options)
    }

    /// Compile a SQL-like statement.
    pub fn compile(&self, statement: &str) -> DbResult<CompiledQuery> {
        Ok(parse_sql_with(statement, self.options)?.build()?)
    }

    /// Compile and run a SQL-like statement.
    pub async fn sql(&self, statement: &str) -> DbResult<Vec<Value>> {
        let compiled = self.compile(statement)?;
        self.run(&compiled).await
    }

    /// Finalize `builder` and run its pipeline.
    pub async fn execute(&self, builder: QueryBuilder) -> DbResult<Vec<Value>> {
        let compiled = builder.build()?;
        self.run(&compiled).await
    }

    pub async fn run(&self, query: &CompiledQuery) -> DbResult<Vec<Value>> {
        for condition in &query.degraded {
            tracing::warn!(
                collection = %query.collection,
                condition = %condition,
                "Unparseable condition replaced by an empty filter"
            );
        }
        tracing::debug!(
            database = %self.name,
            collection = %query.collection,
            stages = query.pipeline.len(),
            "Executing aggregate"
        );

        self.call(
            Operation::Aggregate,
            &query.collection,
            self.store.aggregate(&query.collection, &query.pipeline),
        )
        .await
    }

    /// Insert documents, returning their `_id`s in order.
    pub async fn insert(&self, builder: InsertBuilder) -> DbResult<Vec<Value>> {
        let mut command = builder.build()?;
        tracing::debug!(
            database = %self.name,
            collection = %command.collection,
            documents = command.documents.len(),
            "Executing insert"
        );

        if command.documents.len() == 1 {
            let document = command.documents.remove(0);
            let id = self
                .call(
                    Operation::Insert,
                    &command.collection,
                    self.store.insert_one(&command.collection, document),
                )
                .await?;
            return Ok(vec![id]);
        }

        let documents = std::mem::take(&mut command.documents);
        self.call(
            Operation::Insert,
            &command.collection,
            self.store.insert_many(&command.collection, documents),
        )
        .await
    }

    pub async fn update(&self, builder: UpdateBuilder) -> DbResult<WriteSummary> {
        let command = builder.build()?;
        tracing::debug!(
            database = %self.name,
            collection = %command.collection,
            multi = command.multi,
            "Executing update"
        );

        self.call(
            Operation::Update,
            &command.collection,
            self.store
                .update(&command.collection, &command.filter, &command.changes, command.multi),
        )
        .await
    }

    pub async fn delete(&self, builder: DeleteBuilder) -> DbResult<WriteSummary> {
        let command = builder.build()?;
        tracing::debug!(
            database = %self.name,
            collection = %command.collection,
            multi = command.multi,
            "Executing delete"
        );

        self.call(
            Operation::Delete,
            &command.collection,
            self.store
                .delete(&command.collection, &command.filter, command.multi),
        )
        .await
    }

    /// Create each index in order, stopping at the first failure.
    pub async fn create_indexes(&self, builder: CreateIndexBuilder) -> DbResult<()> {
        let command = builder.build()?;
        for index in &command.indexes {
            self.call(
                Operation::CreateIndex,
                &command.collection,
                self.store.create_index(&command.collection, index),
            )
            .await?;
            tracing::info!(
                collection = %command.collection,
                index = %index.name,
                keys = %index.keys_document(),
                "Index created"
            );
        }
        Ok(())
    }

    pub async fn drop_indexes(&self, builder: DropIndexBuilder) -> DbResult<()> {
        let command = builder.build()?;
        for name in &command.names {
            self.call(
                Operation::DropIndex,
                &command.collection,
                self.store.drop_index(&command.collection, name),
            )
            .await?;
            tracing::info!(collection = %command.collection, index = %name, "Index dropped");
        }
        Ok(())
    }

    async fn call<T, F>(&self, operation: Operation, collection: &str, fut: F) -> DbResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| DbError::execution(operation, collection, e)),
            Err(_) => Err(DbError::Timeout {
                operation,
                collection: collection.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use docql_core::DocqlError;
    use serde_json::json;

    fn db() -> Database<MemoryStore> {
        let store = MemoryStore::from_json(json!({
            "sales": [
                {"region": "eu", "amount": 4000},
                {"region": "eu", "amount": 3000},
                {"region": "us", "amount": 1000},
            ]
        }))
        .unwrap();
        Database::new("test", store)
    }

    #[tokio::test]
    async fn test_sql_group_having() {
        let db = db();
        let docs = db
            .sql("SELECT region, SUM(amount) AS total FROM sales GROUP BY region HAVING total > 5000")
            .await
            .unwrap();
        assert_eq!(docs, vec![json!({"_id": "eu", "total": 7000})]);
    }

    #[tokio::test]
    async fn test_build_errors_are_query_errors() {
        let err = db().execute(QueryBuilder::new()).await.unwrap_err();
        assert!(matches!(err, DbError::Query(DocqlError::CollectionNotSpecified)));
    }

    #[tokio::test]
    async fn test_strict_database_rejects_degraded_filters() {
        let db = db().with_options(CompilerOptions::strict());
        let err = db.sql("SELECT * FROM sales WHERE amount").await.unwrap_err();
        assert!(matches!(err, DbError::Query(DocqlError::InvalidCondition(_))));
    }

    #[tokio::test]
    async fn test_insert_then_query() {
        let db = db();
        let ids = db
            .insert(
                InsertBuilder::new()
                    .insert_into("sales", ["region", "amount"])
                    .values(vec![json!("apac"), json!(250)]),
            )
            .await
            .unwrap();
        assert_eq!(ids.len(), 1);

        let docs = db
            .execute(db.query().from("sales").where_clause("region = 'apac'"))
            .await
            .unwrap();
        assert_eq!(docs[0]["amount"], json!(250));
        assert_eq!(docs[0]["_id"], ids[0]);
    }
}
