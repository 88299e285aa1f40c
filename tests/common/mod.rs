//! Common test utilities
//!
//! Provides shared helper functions for:
//! - Creating seeded in-memory stores
//! - Running statements through a `Database`

#![allow(dead_code)]

use docql::{Database, MemoryStore};
use serde_json::{json, Value};

pub fn create_seeded_store() -> MemoryStore {
    MemoryStore::from_json(json!({
        "users": [
            {"_id": "alice", "name": "Alice", "age": 30, "dept": "eng"},
            {"_id": "bob", "name": "Bob", "age": 25, "dept": "eng"},
            {"_id": "charlie", "name": "Charlie", "age": 35, "dept": "sales"},
            {"_id": "diana", "name": "Diana", "age": 28, "dept": "marketing"},
        ],
        "products": [
            {"_id": "p1", "name": "Widget", "price": 29.99, "category": "gadgets"},
            {"_id": "p2", "name": "Gadget", "price": 49.99, "category": "gadgets"},
            {"_id": "p3", "name": "Thing", "price": 19.99, "category": "misc"},
        ],
        "orders": [
            {"_id": "o1", "user_id": "alice", "total": 79.98, "status": "completed", "region": "eu", "amount": 4000},
            {"_id": "o2", "user_id": "bob", "total": 29.99, "status": "pending", "region": "us", "amount": 1500},
            {"_id": "o3", "user_id": "alice", "total": 49.99, "status": "shipped", "region": "eu", "amount": 2500},
            {"_id": "o4", "user_id": "diana", "total": 9.99, "status": "pending", "region": "apac", "amount": 700},
        ],
    }))
    .expect("seed data is valid")
}

pub fn create_seeded_db() -> Database<MemoryStore> {
    Database::new("test", create_seeded_store())
}

pub async fn execute_sql(db: &Database<MemoryStore>, statement: &str) -> Vec<Value> {
    db.sql(statement)
        .await
        .unwrap_or_else(|e| panic!("Failed to execute {}: {}", statement, e))
}

/// Values of `field` across `docs`, in order.
pub fn field_values(docs: &[Value], field: &str) -> Vec<Value> {
    docs.iter().map(|d| d[field].clone()).collect()
}
