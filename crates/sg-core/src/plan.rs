//! Pure migration planning.
//!
//! Nothing in this module touches a database: given the two stored settings
//! and the caller's [`SchemaHistory`], it decides what a migration run must
//! do. The migrator executes the result.

use crate::app_id::ApplicationId;
use crate::history::SchemaHistory;

/// Outcome of comparing the stored application id with the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityDecision {
    /// The stored id already equals the expected id.
    Matches,
    /// Fresh database (version 0, id unset): write the expected id.
    Adopt,
    /// The database belongs to another application.
    Reject,
}

impl IdentityDecision {
    /// Whether migration may continue.
    pub fn is_allowed(self) -> bool {
        !matches!(self, IdentityDecision::Reject)
    }
}

/// Decide what to do with the stored application id.
///
/// A database is only adopted when *both* the version and the id are at their
/// fresh defaults. An unset id on a database that already has schema versions
/// is rejected.
pub fn reconcile_identity(
    expected: ApplicationId,
    stored: ApplicationId,
    stored_version: i64,
) -> IdentityDecision {
    let identity_matches = stored == expected;
    let is_fresh = stored_version == 0 && stored.is_unset();

    match (identity_matches, is_fresh) {
        (true, _) => IdentityDecision::Matches,
        (false, true) => IdentityDecision::Adopt,
        (false, false) => IdentityDecision::Reject,
    }
}

/// The pending suffix of a schema history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationPlan<'a> {
    from_version: usize,
    pending: &'a [String],
}

impl<'a> MigrationPlan<'a> {
    /// Compute the statements still to apply after `stored_version`.
    ///
    /// Returns `None` when the database is ahead of the history, which means
    /// the caller's code is older than the database.
    pub fn compute(stored_version: usize, history: &'a SchemaHistory) -> Option<Self> {
        let pending = history.statements().get(stored_version..)?;
        Some(Self {
            from_version: stored_version,
            pending,
        })
    }

    /// Version the database is at before the run.
    pub fn from_version(&self) -> usize {
        self.from_version
    }

    /// Version the database will be at after the run.
    pub fn to_version(&self) -> usize {
        self.from_version + self.pending.len()
    }

    /// Number of statements to execute.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the database is already current.
    pub fn is_noop(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending statements paired with their 1-indexed version.
    pub fn steps(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        let first = self.from_version + 1;
        self.pending
            .iter()
            .enumerate()
            .map(move |(offset, sql)| (first + offset, sql.as_str()))
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
