//! Shared fixtures and backend-independent scenarios.

#![allow(dead_code)]

use sg_core::{ApplicationId, SchemaHistory};
use sg_db::SchemaStore;
use sg_migrate::{IdentityDecision, MigrateError, Migrator};

/// A backend the scenarios can run against.
pub trait Fixture: SchemaStore + Sized {
    fn fresh() -> Self;
    fn has_table(&self, name: &str) -> bool;
}

impl Fixture for rusqlite::Connection {
    fn fresh() -> Self {
        rusqlite::Connection::open_in_memory().unwrap()
    }

    fn has_table(&self, name: &str) -> bool {
        let count: i64 = self
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }
}

impl Fixture for duckdb::Connection {
    fn fresh() -> Self {
        duckdb::Connection::open_in_memory().unwrap()
    }

    fn has_table(&self, name: &str) -> bool {
        let count: i64 = self
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = 'main' AND table_name = ?",
                duckdb::params![name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }
}

// ── Schemas ────────────────────────────────────────────────────────────

pub fn test_schema() -> SchemaHistory {
    SchemaHistory::from_statements([
        "CREATE TABLE a (col_a INT)",
        "ALTER TABLE a ADD COLUMN col_b TEXT",
        "ALTER TABLE a RENAME COLUMN col_b TO col_c",
        "CREATE TABLE b (col_b INT)",
    ])
}

pub fn fail_schema() -> SchemaHistory {
    SchemaHistory::from_statements([
        "CREATE TABLE a (col_a INT)", // first apply, should succeed
        "CREATE TABLE b (col_b INT)", // second apply, should revert
        "WHOAAAAA",                   // second apply, fails
    ])
}

pub fn version<S: SchemaStore>(store: &S) -> i64 {
    store.schema_version().unwrap()
}

pub fn app_id<S: SchemaStore>(store: &S) -> ApplicationId {
    store.application_id().unwrap()
}

fn id(value: i32) -> ApplicationId {
    ApplicationId::new(value)
}

// ── Scenarios ──────────────────────────────────────────────────────────

pub fn applies_full_schema_then_noop<F: Fixture>() {
    let mut db = F::fresh();
    let schema = test_schema();
    assert_eq!(version(&db), 0);

    let outcome = Migrator::new(1).apply(&mut db, &schema).unwrap();
    assert_eq!(outcome.identity, IdentityDecision::Adopt);
    assert_eq!(version(&db), schema.len() as i64);
    assert_eq!(app_id(&db), id(1));
    assert!(db.has_table("a"));
    assert!(db.has_table("b"));

    // Second application is a no-op
    let outcome = Migrator::new(1).apply(&mut db, &schema).unwrap();
    assert!(outcome.is_noop());
    assert_eq!(version(&db), schema.len() as i64);
}

pub fn applies_piecemeal<F: Fixture>() {
    let mut db = F::fresh();
    let schema = test_schema();
    let migrator = Migrator::new(1);

    for i in 1..schema.len() {
        let outcome = migrator.apply(&mut db, &schema.prefix(i)).unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(version(&db), i as i64);
    }
    migrator.apply(&mut db, &schema).unwrap();

    let mut direct = F::fresh();
    migrator.apply(&mut direct, &schema).unwrap();

    assert_eq!(version(&db), version(&direct));
    assert_eq!(app_id(&db), app_id(&direct));
    for table in ["a", "b"] {
        assert_eq!(db.has_table(table), direct.has_table(table));
    }
}

pub fn failure_rolls_back_everything<F: Fixture>() {
    let mut db = F::fresh();
    let schema = fail_schema();
    let migrator = Migrator::new(1);

    migrator.apply(&mut db, &schema.prefix(1)).unwrap();
    assert_eq!(version(&db), 1);
    assert!(db.has_table("a"));
    assert!(!db.has_table("b"));

    let err = migrator.apply(&mut db, &schema).unwrap_err();
    assert!(
        matches!(err, MigrateError::StatementFailed { position: 3, .. }),
        "unexpected error: {err}"
    );
    assert_eq!(version(&db), 1);
    assert!(db.has_table("a"));
    assert!(!db.has_table("b"));

    // The database is still usable and the fixed schema applies
    let fixed = schema.prefix(2);
    migrator.apply(&mut db, &fixed).unwrap();
    assert_eq!(version(&db), 2);
    assert!(db.has_table("b"));
}

pub fn adopts_identity_with_empty_schema<F: Fixture>() {
    let mut db = F::fresh();
    let empty = SchemaHistory::new();

    Migrator::new(0x5347).apply(&mut db, &empty).unwrap();
    assert_eq!(app_id(&db), id(0x5347));
    assert_eq!(version(&db), 0);

    let outcome = Migrator::new(0x5347).apply(&mut db, &empty).unwrap();
    assert_eq!(outcome.identity, IdentityDecision::Matches);

    Migrator::new(0x5347).apply(&mut db, &test_schema()).unwrap();
    assert_eq!(version(&db), test_schema().len() as i64);
}

pub fn adopts_full_width_identity<F: Fixture>() {
    let mut db = F::fresh();
    let tag = ApplicationId::from_bits(0xdead_beef);
    Migrator::new(tag).apply(&mut db, &test_schema()).unwrap();
    assert_eq!(app_id(&db), tag);
    Migrator::new(tag).apply(&mut db, &test_schema()).unwrap();
}

pub fn rejects_foreign_identity<F: Fixture>() {
    let mut db = F::fresh();
    let schema = test_schema();
    Migrator::new(1).apply(&mut db, &schema).unwrap();

    let err = Migrator::new(0xdead).apply(&mut db, &schema).unwrap_err();
    assert!(matches!(err, MigrateError::IdentityMismatch { .. }), "{err}");
    assert_eq!(app_id(&db), id(1));
    assert_eq!(version(&db), schema.len() as i64);
}

pub fn rejects_foreign_identity_on_empty_database<F: Fixture>() {
    let mut db = F::fresh();
    let empty = SchemaHistory::new();
    Migrator::new(1).apply(&mut db, &empty).unwrap();

    let err = Migrator::new(0xdead).apply(&mut db, &empty).unwrap_err();
    assert!(matches!(err, MigrateError::IdentityMismatch { .. }), "{err}");
    assert_eq!(app_id(&db), id(1));
    assert_eq!(version(&db), 0);
}

pub fn rejects_short_schema<F: Fixture>() {
    let mut db = F::fresh();
    let schema = test_schema();
    Migrator::new(1).apply(&mut db, &schema).unwrap();

    let err = Migrator::new(1)
        .apply(&mut db, &schema.prefix(2))
        .unwrap_err();
    assert!(
        matches!(err, MigrateError::VersionOverrun { stored: 4, available: 2 }),
        "{err}"
    );
    assert_eq!(version(&db), schema.len() as i64);
}

pub fn inspect_never_writes<F: Fixture>() {
    let db = F::fresh();
    let status = Migrator::new(9).inspect(&db, &test_schema()).unwrap();
    assert_eq!(status.identity, IdentityDecision::Adopt);
    assert_eq!(status.pending, Some(test_schema().len()));
    assert_eq!(app_id(&db), ApplicationId::UNSET);
    assert_eq!(version(&db), 0);
}

pub fn cancelled_token_leaves_database_untouched<F: Fixture>() {
    let mut db = F::fresh();
    let token = sg_migrate::CancelToken::new();
    token.cancel();
    let err = Migrator::new(1)
        .with_cancel_token(token)
        .apply(&mut db, &test_schema())
        .unwrap_err();
    assert!(matches!(err, MigrateError::Cancelled { .. }), "{err}");
    assert_eq!(app_id(&db), ApplicationId::UNSET);
    assert_eq!(version(&db), 0);
    assert!(!db.has_table("a"));
}
