pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod store;

pub use config::Config;
pub use database::Database;
pub use error::{DbError, DbResult, Operation};
pub use store::{MemoryStore, Store, StoreError, StoreResult, WriteSummary};

pub use docql_core;
