//! Builders: the read pipeline compiler plus write and index commands.

mod index;
mod query;
mod write;

pub use index::{
    CreateIndexBuilder, CreateIndexCommand, DropIndexBuilder, DropIndexCommand, IndexModel,
};
pub use query::{CompiledQuery, QueryBuilder};
pub use write::{
    DeleteBuilder, DeleteCommand, InsertBuilder, InsertCommand, UpdateBuilder, UpdateCommand,
};
