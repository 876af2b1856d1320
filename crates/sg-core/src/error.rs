//! Error types for sg-core

use thiserror::Error;

/// Core error type for SchemaGuard
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: IO error with file path context
    #[error("[C003] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C004: YAML parse error
    #[error("[C004] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// C005: Schema directory not found
    #[error("[C005] Schema directory not found: {path}")]
    SchemaDirNotFound { path: String },

    /// C006: Numbered schema files are not a contiguous 1..=N sequence
    #[error("[C006] Invalid schema sequence in {path}: {reason}")]
    MigrationSequence { path: String, reason: String },

    /// C007: Application id could not be parsed
    #[error("[C007] Invalid application id '{input}': {reason}")]
    InvalidApplicationId { input: String, reason: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
