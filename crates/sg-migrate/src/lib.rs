//! sg-migrate - Schema migrator for SchemaGuard
//!
//! Brings a database's schema version up to the length of a
//! [`SchemaHistory`](sg_core::SchemaHistory) in one transaction, after checking
//! that the database belongs to the calling application.
//!
//! ```no_run
//! use sg_core::{ApplicationId, SchemaHistory};
//! use sg_migrate::Migrator;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut conn = rusqlite::Connection::open("app.db")?;
//! let history = SchemaHistory::from_statements([
//!     "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
//!     "ALTER TABLE users ADD COLUMN email TEXT",
//! ]);
//! Migrator::new(ApplicationId::from_bits(0x5347_0001)).apply(&mut conn, &history)?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod error;
pub mod migrator;
mod runner;

pub use cancel::CancelToken;
pub use error::{MigrateError, MigrateResult};
pub use migrator::{MigrationOutcome, Migrator, SchemaStatus};
pub use sg_core::IdentityDecision;
