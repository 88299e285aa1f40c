//! End-to-end query tests: statements and builders executed on a seeded
//! in-memory store.

mod common;

use common::{create_seeded_db, execute_sql, field_values};
use docql::docql_core::{CompilerOptions, DocqlError};
use docql::DbError;
use serde_json::json;

#[tokio::test]
async fn test_where_order_limit_offset() {
    let db = create_seeded_db();
    let docs = execute_sql(
        &db,
        "SELECT name, age FROM users WHERE age > 26 ORDER BY age DESC LIMIT 2 OFFSET 1",
    )
    .await;

    assert_eq!(field_values(&docs, "name"), vec![json!("Alice"), json!("Diana")]);
    assert_eq!(docs[0], json!({"_id": "alice", "name": "Alice", "age": 30}));
}

#[tokio::test]
async fn test_and_conditions() {
    let db = create_seeded_db();
    let docs = execute_sql(
        &db,
        "SELECT * FROM products WHERE price > 20 AND category = 'gadgets' ORDER BY price ASC",
    )
    .await;
    assert_eq!(field_values(&docs, "name"), vec![json!("Widget"), json!("Gadget")]);
}

#[tokio::test]
async fn test_or_conditions() {
    let db = create_seeded_db();
    let docs = execute_sql(&db, "SELECT * FROM users WHERE dept = 'sales' OR age < 26").await;
    assert_eq!(field_values(&docs, "name"), vec![json!("Bob"), json!("Charlie")]);
}

#[tokio::test]
async fn test_group_by_with_accumulators() {
    let db = create_seeded_db();
    let docs = execute_sql(
        &db,
        "SELECT region, SUM(amount) AS total, COUNT(*) AS orders FROM orders \
         GROUP BY region ORDER BY total DESC",
    )
    .await;

    assert_eq!(
        docs,
        vec![
            json!({"_id": "eu", "total": 6500, "orders": 2}),
            json!({"_id": "us", "total": 1500, "orders": 1}),
            json!({"_id": "apac", "total": 700, "orders": 1}),
        ]
    );
}

#[tokio::test]
async fn test_having_with_computed_expression() {
    let db = create_seeded_db();
    let docs = execute_sql(
        &db,
        "SELECT region, SUM(amount) AS total, COUNT(*) AS cnt FROM orders \
         GROUP BY region HAVING total / cnt > 1000",
    )
    .await;
    assert_eq!(field_values(&docs, "_id"), vec![json!("eu"), json!("us")]);
}

#[tokio::test]
async fn test_malformed_condition_matches_everything() {
    let db = create_seeded_db();
    let docs = execute_sql(&db, "SELECT * FROM users WHERE age").await;
    assert_eq!(docs.len(), 4);
}

#[tokio::test]
async fn test_strict_mode_rejects_malformed_clauses() {
    let db = create_seeded_db().with_options(CompilerOptions::strict());

    let err = db.sql("SELECT * FROM users WHERE age").await.unwrap_err();
    assert!(matches!(err, DbError::Query(DocqlError::InvalidCondition(_))));

    let err = db
        .sql("SELECT * FROM users ORDER BY age up down")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Query(DocqlError::InvalidOrderBy(_))));
}

#[tokio::test]
async fn test_statement_errors_surface_as_query_errors() {
    let db = create_seeded_db();

    let err = db.sql("UPDATE users SET a = 1").await.unwrap_err();
    assert!(matches!(err, DbError::Query(DocqlError::ExpectedSelect)));

    let err = db
        .sql("SELECT * FROM users LIMIT 1 LIMIT 2")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Query(DocqlError::DuplicateClause(_))));

    let err = db.sql("SELECT * FROM users LIMIT many").await.unwrap_err();
    assert!(matches!(err, DbError::Query(DocqlError::InvalidLimit(_))));
}

#[tokio::test]
async fn test_join_through_builder() {
    let db = create_seeded_db();
    let docs = db
        .execute(
            db.query()
                .from("orders")
                .join("user_id", "users", "_id", "user")
                .where_clause("status = 'pending'")
                .order_by("total DESC"),
        )
        .await
        .unwrap();

    assert_eq!(field_values(&docs, "_id"), vec![json!("o2"), json!("o4")]);
    assert_eq!(docs[0]["user"][0]["name"], json!("Bob"));
    assert_eq!(docs[1]["user"][0]["name"], json!("Diana"));
}

#[tokio::test]
async fn test_aggregation_limit_is_positional() {
    let db = create_seeded_db();
    let docs = db
        .execute(db.query().from("users").order_by("age ASC").aggregation_limit(2))
        .await
        .unwrap();
    assert_eq!(field_values(&docs, "name"), vec![json!("Bob"), json!("Diana")]);
}

#[tokio::test]
async fn test_limit_and_offset_call_order_does_not_matter() {
    let db = create_seeded_db();

    let a = db
        .execute(db.query().from("users").order_by("age").limit(1).offset(2))
        .await
        .unwrap();
    let b = db
        .execute(db.query().from("users").order_by("age").offset(2).limit(1))
        .await
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(field_values(&a, "name"), vec![json!("Alice")]);
}

#[tokio::test]
async fn test_unknown_collection_returns_nothing() {
    let db = create_seeded_db();
    assert!(execute_sql(&db, "SELECT * FROM ghosts").await.is_empty());
}

#[test]
fn test_compile_renders_pipeline_document() {
    let db = create_seeded_db();
    let compiled = db
        .compile("SELECT field1, field2 FROM orders WHERE status = 'active' ORDER BY field1 ASC LIMIT 10 OFFSET 20")
        .unwrap();

    assert_eq!(
        compiled.to_document(),
        json!({
            "collection": "orders",
            "pipeline": [
                {"$project": {"field1": 1, "field2": 1}},
                {"$match": {"status": {"$eq": "active"}}},
                {"$sort": {"field1": 1}},
                {"$skip": 20},
                {"$limit": 10},
            ]
        })
    );
}
