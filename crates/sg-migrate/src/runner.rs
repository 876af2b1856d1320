//! Async entry point for services that migrate from inside a tokio runtime.

use crate::cancel::CancelOnDrop;
use crate::error::{MigrateError, MigrateResult};
use crate::migrator::{MigrationOutcome, Migrator};
use sg_core::SchemaHistory;
use sg_db::SchemaStore;
use std::sync::{Arc, Mutex};

impl Migrator {
    /// Run [`apply`](Self::apply) on tokio's blocking pool.
    ///
    /// The store stays owned by the caller behind `Arc<Mutex<_>>` and is
    /// locked for the duration of the run. If the returned future is dropped
    /// before completion, this migrator's cancel token is cancelled, so the
    /// blocking run rolls back its transaction. The token is shared with
    /// clones of the migrator and stays cancelled afterwards.
    pub async fn apply_shared<S>(
        &self,
        store: Arc<Mutex<S>>,
        history: Arc<SchemaHistory>,
    ) -> MigrateResult<MigrationOutcome>
    where
        S: SchemaStore + Send + 'static,
    {
        let migrator = self.clone();
        let cancel_on_drop = CancelOnDrop::new(self.cancel_token().clone());

        let joined = tokio::task::spawn_blocking(move || {
            let mut store = store.lock().map_err(|_| MigrateError::StorePoisoned)?;
            migrator.apply(&mut *store, &history)
        })
        .await;

        cancel_on_drop.disarm();
        joined.map_err(|e| MigrateError::TaskFailed(e.to_string()))?
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
