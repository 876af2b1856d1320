//! Ordered schema history.
//!
//! A [`SchemaHistory`] is the full, cumulative list of schema statements from
//! version 0 to the caller's current code version. Entry `i` (1-indexed) is
//! the change that moves the database from version `i - 1` to version `i`.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Ordered, append-only list of schema statements.
///
/// One entry may contain several `;`-separated SQL statements; it is still a
/// single version step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaHistory {
    statements: Vec<String>,
}

impl SchemaHistory {
    /// An empty history (version 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from statements in version order.
    pub fn from_statements<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statements: statements.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a history from a directory of numbered `.sql` files.
    ///
    /// Files are named `<version>[_<description>].sql` (for example
    /// `001_create_users.sql`). Files without a leading number or without the
    /// `.sql` extension are ignored. The versions must form exactly
    /// `1..=N`.
    pub fn load_dir(dir: &Path) -> CoreResult<Self> {
        if !dir.is_dir() {
            return Err(CoreError::SchemaDirNotFound {
                path: dir.display().to_string(),
            });
        }

        let io_err = |path: &Path, source: std::io::Error| CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        };
        let sequence_err = |reason: String| CoreError::MigrationSequence {
            path: dir.display().to_string(),
            reason,
        };

        let mut by_version: BTreeMap<usize, std::path::PathBuf> = BTreeMap::new();
        for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let path = entry.map_err(|e| io_err(dir, e))?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
                continue;
            }
            let Some(digits) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(version_prefix)
            else {
                log::debug!("Skipping unnumbered schema file {}", path.display());
                continue;
            };
            let version: usize = digits.parse().map_err(|_| {
                sequence_err(format!(
                    "version {digits} of {} is out of range",
                    path.display()
                ))
            })?;

            if let Some(existing) = by_version.insert(version, path.clone()) {
                return Err(sequence_err(format!(
                    "version {version} is defined by both {} and {}",
                    existing.display(),
                    path.display()
                )));
            }
        }

        let mut statements = Vec::with_capacity(by_version.len());
        for (expected, (version, path)) in (1..).zip(by_version) {
            if version != expected {
                return Err(sequence_err(format!(
                    "expected version {expected}, found {version} ({})",
                    path.display()
                )));
            }
            statements.push(std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?);
        }

        log::debug!(
            "Loaded {} schema versions from {}",
            statements.len(),
            dir.display()
        );
        Ok(Self { statements })
    }

    /// Number of versions defined, which is the target schema version.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether no versions are defined.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All statements in version order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Statement for a 1-indexed version, if defined.
    pub fn get(&self, version: usize) -> Option<&str> {
        version
            .checked_sub(1)
            .and_then(|idx| self.statements.get(idx))
            .map(String::as_str)
    }

    /// A history holding only the first `len` versions.
    ///
    /// Useful for reproducing what an older build of the application would
    /// have applied.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            statements: self.statements[..len.min(self.statements.len())].to_vec(),
        }
    }

    /// Append the next version.
    pub fn push(&mut self, statement: impl Into<String>) {
        self.statements.push(statement.into());
    }
}

impl<S: Into<String>> FromIterator<S> for SchemaHistory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_statements(iter)
    }
}

/// The leading decimal digits of a file stem, if they form a version prefix.
fn version_prefix(stem: &str) -> Option<&str> {
    let digits: &str = &stem[..stem
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stem.len())];
    let rest = &stem[digits.len()..];
    if digits.is_empty() || !(rest.is_empty() || rest.starts_with(['_', '-', '.'])) {
        return None;
    }
    Some(digits)
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
