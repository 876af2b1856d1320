use super::*;

fn has_table(conn: &Connection, name: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap();
    count == 1
}

#[test]
fn test_fresh_database_defaults() {
    let conn = Connection::open_in_memory().unwrap();
    assert_eq!(conn.backend_name(), "sqlite");
    assert_eq!(conn.schema_version().unwrap(), 0);
    assert_eq!(conn.application_id().unwrap(), ApplicationId::UNSET);
}

#[test]
fn test_set_application_id_round_trips() {
    let conn = Connection::open_in_memory().unwrap();
    let id = ApplicationId::from_bits(0xdead_beef);
    conn.set_application_id(id).unwrap();
    assert_eq!(conn.application_id().unwrap(), id);

    // Idempotent
    conn.set_application_id(id).unwrap();
    assert_eq!(conn.application_id().unwrap(), id);
}

#[test]
fn test_commit_applies_statements_and_version() {
    let mut conn = Connection::open_in_memory().unwrap();
    {
        let mut tx = conn.begin().unwrap();
        tx.execute("CREATE TABLE a (x INT)").unwrap();
        tx.set_schema_version(1).unwrap();
        tx.commit().unwrap();
    }
    assert!(has_table(&conn, "a"));
    assert_eq!(conn.schema_version().unwrap(), 1);
}

#[test]
fn test_execute_runs_multi_statement_entry() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut tx = conn.begin().unwrap();
    tx.execute("CREATE TABLE a (x INT); CREATE TABLE b (y INT);")
        .unwrap();
    tx.commit().unwrap();
    assert!(has_table(&conn, "a"));
    assert!(has_table(&conn, "b"));
}

#[test]
fn test_rollback_discards_statements_and_version() {
    let mut conn = Connection::open_in_memory().unwrap();
    {
        let mut tx = conn.begin().unwrap();
        tx.execute("CREATE TABLE a (x INT)").unwrap();
        tx.set_schema_version(5).unwrap();
        tx.rollback().unwrap();
    }
    assert!(!has_table(&conn, "a"));
    assert_eq!(conn.schema_version().unwrap(), 0);
}

#[test]
fn test_drop_rolls_back() {
    let mut conn = Connection::open_in_memory().unwrap();
    {
        let mut tx = conn.begin().unwrap();
        tx.execute("CREATE TABLE a (x INT)").unwrap();
        tx.set_schema_version(1).unwrap();
    }
    assert!(!has_table(&conn, "a"));
    assert_eq!(conn.schema_version().unwrap(), 0);
}

#[test]
fn test_invalid_statement_errors() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut tx = conn.begin().unwrap();
    let err = tx.execute("WHOAAAAA").unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)), "{err}");
}

#[test]
fn test_statement_ending_transaction_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut tx = conn.begin().unwrap();
    let err = tx.execute("CREATE TABLE a (x INT); COMMIT;").unwrap_err();
    assert!(matches!(err, DbError::TransactionEscaped), "{err}");
}

#[test]
fn test_version_out_of_range() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut tx = conn.begin().unwrap();
    let err = tx.set_schema_version(i64::from(i32::MAX) + 1).unwrap_err();
    assert!(matches!(
        err,
        DbError::ValueOutOfRange {
            setting: "user_version",
            ..
        }
    ));
}

#[test]
fn test_settings_persist_in_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    {
        let mut conn = Connection::open(&path).unwrap();
        conn.set_application_id(ApplicationId::new(9)).unwrap();
        let mut tx = conn.begin().unwrap();
        tx.set_schema_version(3).unwrap();
        tx.commit().unwrap();
    }
    let conn = Connection::open(&path).unwrap();
    assert_eq!(conn.application_id().unwrap(), ApplicationId::new(9));
    assert_eq!(conn.schema_version().unwrap(), 3);
}

#[test]
fn test_interrupt_handle_is_available() {
    let conn = Connection::open_in_memory().unwrap();
    let interrupt = SchemaStore::interrupt_handle(&conn).expect("sqlite supports interrupts");
    // Nothing is running; interrupting is a no-op.
    interrupt();
    assert_eq!(conn.schema_version().unwrap(), 0);
}
