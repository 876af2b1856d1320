//! Storage traits the migrator runs against

use crate::error::DbResult;
use sg_core::ApplicationId;

/// Callback that aborts whatever statement the connection is running.
pub type InterruptFn = Box<dyn Fn() + Send + Sync>;

/// A database whose schema is managed by SchemaGuard.
///
/// Exposes the two persistent integer settings (application id and schema
/// version), both reading as 0 on a fresh database, and a transaction in which
/// schema statements and the version update run atomically.
///
/// Implementations borrow the caller's connection; they never close it.
pub trait SchemaStore {
    /// Short backend name for log messages
    fn backend_name(&self) -> &'static str;

    /// Read the schema version outside any transaction
    fn schema_version(&self) -> DbResult<i64>;

    /// Read the application id outside any transaction
    fn application_id(&self) -> DbResult<ApplicationId>;

    /// Write the application id immediately (autocommit).
    ///
    /// Must be idempotent: writing the same id twice leaves the same state.
    fn set_application_id(&self, id: ApplicationId) -> DbResult<()>;

    /// Begin the migration transaction.
    ///
    /// Dropping the returned transaction without committing rolls it back.
    fn begin(&mut self) -> DbResult<Box<dyn SchemaTransaction + '_>>;

    /// Handle that interrupts in-flight work from another thread, if the
    /// backend supports it.
    fn interrupt_handle(&self) -> Option<InterruptFn> {
        None
    }
}

/// An open migration transaction.
pub trait SchemaTransaction {
    /// Execute one schema entry (may hold several `;`-separated statements)
    fn execute(&mut self, sql: &str) -> DbResult<()>;

    /// Set the schema version as part of this transaction
    fn set_schema_version(&mut self, version: i64) -> DbResult<()>;

    /// Commit all work; on failure nothing is applied
    fn commit(self: Box<Self>) -> DbResult<()>;

    /// Discard all work
    fn rollback(self: Box<Self>) -> DbResult<()>;
}
