//! Migration runner.
//!
//! [`Migrator::apply`] reads the stored version and application id, settles
//! the identity, and applies the pending suffix of the schema history plus the
//! version update in a single transaction. Either the database ends at
//! `history.len()` or it is left as it was; the only write outside the
//! transaction is adopting the application id of a fresh database, which is
//! idempotent.

use crate::cancel::CancelToken;
use crate::error::{MigrateError, MigrateResult};
use sg_core::{reconcile_identity, ApplicationId, IdentityDecision, MigrationPlan, SchemaHistory};
use sg_db::{DbError, SchemaStore, SchemaTransaction};

/// Applies a schema history on behalf of one application.
#[derive(Debug, Clone)]
pub struct Migrator {
    app_id: ApplicationId,
    cancel: CancelToken,
}

/// What a successful [`Migrator::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Schema version before the run
    pub from_version: usize,
    /// Schema version after the run (the history length)
    pub to_version: usize,
    /// Number of schema entries executed
    pub applied: usize,
    /// `Matches`, or `Adopt` when the application id was written
    pub identity: IdentityDecision,
}

impl MigrationOutcome {
    /// Whether the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.applied == 0 && self.identity == IdentityDecision::Matches
    }
}

/// Read-only view of a database relative to a schema history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStatus {
    /// Stored schema version
    pub version: i64,
    /// Stored application id
    pub application_id: ApplicationId,
    /// What `apply` would decide about the identity
    pub identity: IdentityDecision,
    /// Entries `apply` would execute; `None` if the database is ahead of the
    /// history or its version is invalid
    pub pending: Option<usize>,
}

impl SchemaStatus {
    /// Whether `apply` would succeed without executing anything.
    pub fn is_current(&self) -> bool {
        self.identity == IdentityDecision::Matches && self.pending == Some(0)
    }
}

impl Migrator {
    /// Create a migrator for the given application id.
    pub fn new(app_id: impl Into<ApplicationId>) -> Self {
        Self {
            app_id: app_id.into(),
            cancel: CancelToken::new(),
        }
    }

    /// Use `token` to cancel runs from another thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// The application id this migrator expects.
    pub fn application_id(&self) -> ApplicationId {
        self.app_id
    }

    /// The token checked between migration steps.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Bring `store` up to `history.len()`.
    ///
    /// Running the same history twice is a no-op. Callers must only ever
    /// append to `history`; entries already applied are not re-checked.
    pub fn apply<S>(&self, store: &mut S, history: &SchemaHistory) -> MigrateResult<MigrationOutcome>
    where
        S: SchemaStore + ?Sized,
    {
        let backend = store.backend_name();
        self.check_cancelled("before reading settings")?;
        let (stored_version, stored_id) = read_settings(store)?;

        let identity = reconcile_identity(self.app_id, stored_id, stored_version);
        match identity {
            IdentityDecision::Matches => {}
            IdentityDecision::Adopt => {
                self.check_cancelled("before writing application_id")?;
                store
                    .set_application_id(self.app_id)
                    .map_err(|source| MigrateError::IdentityWrite {
                        expected: self.app_id,
                        source,
                    })?;
                log::info!(
                    "Adopted fresh {backend} database for application_id {}",
                    self.app_id
                );
            }
            IdentityDecision::Reject => {
                return Err(MigrateError::IdentityMismatch {
                    expected: self.app_id,
                    found: stored_id,
                });
            }
        }

        let from_version = usize::try_from(stored_version).map_err(|_| {
            MigrateError::InvalidVersion {
                found: stored_version,
            }
        })?;
        let plan = MigrationPlan::compute(from_version, history).ok_or(
            MigrateError::VersionOverrun {
                stored: stored_version,
                available: history.len(),
            },
        )?;

        self.check_cancelled("before beginning the transaction")?;
        let interrupt = store.interrupt_handle();
        let _registration = interrupt.map(|handle| self.cancel.register(handle));

        let mut tx = store.begin().map_err(|source| MigrateError::Transaction {
            stage: "begin",
            source,
        })?;

        for (position, sql) in plan.steps() {
            if self.cancel.is_cancelled() {
                rollback(tx, backend);
                return Err(self.cancelled_at(position));
            }
            log::debug!("Applying schema v{position:03}");
            if let Err(source) = tx.execute(sql) {
                rollback(tx, backend);
                if self.cancel.is_cancelled() {
                    return Err(self.cancelled_at(position));
                }
                return Err(MigrateError::StatementFailed { position, source });
            }
        }

        let to_version = plan.to_version();
        let version_update = i64::try_from(to_version)
            .map_err(|_| DbError::ValueOutOfRange {
                setting: "schema_version",
                value: i64::MAX,
            })
            .and_then(|version| tx.set_schema_version(version));
        if let Err(source) = version_update {
            rollback(tx, backend);
            return Err(MigrateError::VersionUpdate {
                version: to_version,
                source,
            });
        }

        if self.cancel.is_cancelled() {
            rollback(tx, backend);
            return Err(MigrateError::Cancelled {
                stage: "before commit".to_string(),
            });
        }
        tx.commit().map_err(|source| MigrateError::Transaction {
            stage: "commit",
            source,
        })?;

        let outcome = MigrationOutcome {
            from_version: plan.from_version(),
            to_version,
            applied: plan.len(),
            identity,
        };
        if plan.is_noop() {
            log::debug!("{backend} schema already at v{to_version:03}");
        } else {
            log::info!(
                "Migrated {backend} schema from v{:03} to v{:03} ({} applied)",
                outcome.from_version,
                outcome.to_version,
                outcome.applied
            );
        }
        Ok(outcome)
    }

    /// Report what [`apply`](Self::apply) would do, without writing.
    pub fn inspect<S>(&self, store: &S, history: &SchemaHistory) -> MigrateResult<SchemaStatus>
    where
        S: SchemaStore + ?Sized,
    {
        let (version, application_id) = read_settings(store)?;
        let pending = usize::try_from(version)
            .ok()
            .and_then(|v| MigrationPlan::compute(v, history))
            .map(|plan| plan.len());
        Ok(SchemaStatus {
            version,
            application_id,
            identity: reconcile_identity(self.app_id, application_id, version),
            pending,
        })
    }

    fn check_cancelled(&self, stage: &str) -> MigrateResult<()> {
        if self.cancel.is_cancelled() {
            return Err(MigrateError::Cancelled {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }

    fn cancelled_at(&self, position: usize) -> MigrateError {
        MigrateError::Cancelled {
            stage: format!("at schema version {position}"),
        }
    }
}

/// Read the version, then the application id, outside any transaction.
fn read_settings<S>(store: &S) -> MigrateResult<(i64, ApplicationId)>
where
    S: SchemaStore + ?Sized,
{
    let version = store
        .schema_version()
        .map_err(|source| MigrateError::SettingRead {
            setting: "schema_version",
            source,
        })?;
    let app_id = store
        .application_id()
        .map_err(|source| MigrateError::SettingRead {
            setting: "application_id",
            source,
        })?;
    Ok((version, app_id))
}

/// Roll back after a failure; the caller sees the first error.
fn rollback(tx: Box<dyn SchemaTransaction + '_>, backend: &str) {
    if let Err(e) = tx.rollback() {
        log::warn!("Rollback of {backend} migration transaction failed: {e}");
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
