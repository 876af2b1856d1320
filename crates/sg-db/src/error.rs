//! Error types for sg-db

use thiserror::Error;

/// Storage errors raised while reading settings or running statements
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLite driver error (D001)
    #[error("[D001] SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    /// DuckDB driver error (D002)
    #[error("[D002] DuckDB error: {0}")]
    DuckDb(#[source] duckdb::Error),

    /// Setting value cannot be represented by the backend (D003)
    #[error("[D003] Value {value} is out of range for setting '{setting}'")]
    ValueOutOfRange { setting: &'static str, value: i64 },

    /// A statement committed or rolled back the migration transaction (D004).
    ///
    /// Work done before the escaping statement may already be committed; the
    /// schema version is not advanced.
    #[error("[D004] Statement ended the enclosing transaction; schema statements must not contain COMMIT, ROLLBACK or END")]
    TransactionEscaped,
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        DbError::Sqlite(err)
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::DuckDb(err)
    }
}
