//! sg-db - Storage seam for SchemaGuard
//!
//! This crate provides the [`SchemaStore`] and [`SchemaTransaction`] traits
//! the migrator runs against, implemented for `rusqlite::Connection` (header
//! pragmas) and `duckdb::Connection` (a settings table).

pub mod duckdb;
pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::{DbError, DbResult};
pub use traits::{InterruptFn, SchemaStore, SchemaTransaction};
