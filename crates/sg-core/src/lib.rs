//! sg-core - Core library for SchemaGuard
//!
//! This crate provides the application identity type, the ordered schema
//! history, the pure migration planning functions, and `schemaguard.yml`
//! configuration parsing shared by the storage and migrator crates.

pub mod app_id;
pub mod config;
pub mod error;
pub mod history;
pub mod plan;

pub use app_id::ApplicationId;
pub use config::{Config, SchemaSource};
pub use error::{CoreError, CoreResult};
pub use history::SchemaHistory;
pub use plan::{reconcile_identity, IdentityDecision, MigrationPlan};
