//! Configuration types and parsing for schemaguard.yml

use crate::app_id::ApplicationId;
use crate::error::{CoreError, CoreResult};
use crate::history::SchemaHistory;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Migration configuration from schemaguard.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Application id written to fresh databases and checked on every run
    pub application_id: ApplicationId,

    /// Where the ordered schema statements come from
    pub schema: SchemaConfig,
}

/// Raw `schema:` section; exactly one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Directory of numbered `.sql` files, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// Inline statements in version order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<String>>,
}

/// Validated schema source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource<'a> {
    /// Numbered `.sql` files in a directory
    Directory(&'a str),
    /// Statements listed in the config itself
    Inline(&'a [String]),
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for schemaguard.yml or schemaguard.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("schemaguard.yml");
        let yaml_path = dir.join("schemaguard.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        self.schema_source().map(|_| ())
    }

    /// The configured schema source.
    pub fn schema_source(&self) -> CoreResult<SchemaSource<'_>> {
        match (&self.schema.directory, &self.schema.statements) {
            (Some(dir), None) if dir.trim().is_empty() => Err(CoreError::ConfigInvalid {
                message: "schema.directory must not be empty".to_string(),
            }),
            (Some(dir), None) => Ok(SchemaSource::Directory(dir)),
            (None, Some(statements)) => Ok(SchemaSource::Inline(statements)),
            (Some(_), Some(_)) => Err(CoreError::ConfigInvalid {
                message: "schema.directory and schema.statements are mutually exclusive"
                    .to_string(),
            }),
            (None, None) => Err(CoreError::ConfigInvalid {
                message: "schema requires either `directory` or `statements`".to_string(),
            }),
        }
    }

    /// Build the schema history this config describes.
    ///
    /// `root` is the directory holding the config file.
    pub fn schema_history(&self, root: &Path) -> CoreResult<SchemaHistory> {
        match self.schema_source()? {
            SchemaSource::Directory(dir) => SchemaHistory::load_dir(&root.join(dir)),
            SchemaSource::Inline(statements) => {
                Ok(SchemaHistory::from_statements(statements.iter().cloned()))
            }
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
