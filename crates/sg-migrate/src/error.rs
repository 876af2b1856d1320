//! Error types for sg-migrate

use sg_core::ApplicationId;
use sg_db::DbError;
use thiserror::Error;

/// Migration errors. Every variant is terminal for the call; the migrator
/// never retries.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// A persistent setting could not be read (SG001)
    #[error("[SG001] Failed to read {setting}: {source}")]
    SettingRead {
        setting: &'static str,
        source: DbError,
    },

    /// Writing the application id to a fresh database failed (SG002)
    #[error("[SG002] Failed to set application_id to {expected}: {source}")]
    IdentityWrite {
        expected: ApplicationId,
        source: DbError,
    },

    /// The database belongs to a different application (SG003)
    #[error("[SG003] Wrong application_id: expected {expected}, got {found}")]
    IdentityMismatch {
        expected: ApplicationId,
        found: ApplicationId,
    },

    /// The database is newer than the supplied schema (SG004)
    #[error("[SG004] Existing schema version is {stored}, while the schema has only {available} versions")]
    VersionOverrun { stored: i64, available: usize },

    /// The stored schema version is negative (SG005)
    #[error("[SG005] Stored schema version {found} is invalid; versions are never negative")]
    InvalidVersion { found: i64 },

    /// A schema statement failed; the transaction was rolled back (SG006)
    #[error("[SG006] Failed to apply schema version {position}: {source}")]
    StatementFailed { position: usize, source: DbError },

    /// Updating the version counter failed; the transaction was rolled back (SG007)
    #[error("[SG007] Failed to update schema version to {version}: {source}")]
    VersionUpdate { version: usize, source: DbError },

    /// Beginning or committing the migration transaction failed (SG008)
    #[error("[SG008] Failed to {stage} migration transaction: {source}")]
    Transaction {
        stage: &'static str,
        source: DbError,
    },

    /// The cancel token fired; open work was rolled back (SG009)
    #[error("[SG009] Migration cancelled {stage}")]
    Cancelled { stage: String },

    /// The shared store's mutex was poisoned by an earlier panic (SG010)
    #[error("[SG010] Schema store mutex poisoned")]
    StorePoisoned,

    /// The background migration task panicked or was aborted (SG011)
    #[error("[SG011] Migration task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
