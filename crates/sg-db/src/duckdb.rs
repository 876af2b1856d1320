//! DuckDB backend.
//!
//! DuckDB has no header pragmas, so both settings are rows in
//! `sg_meta.settings`. A missing table or row reads as 0; reads never create
//! the table. Transactions are explicit `BEGIN TRANSACTION` / `COMMIT` on the
//! connection.
//!
//! `Connection::is_autocommit` always reports true for DuckDB, so a
//! transaction is identified by its `txid_current()` start stamp instead.

use crate::error::{DbError, DbResult};
use crate::traits::{InterruptFn, SchemaStore, SchemaTransaction};
use duckdb::Connection;
use sg_core::ApplicationId;

const SCHEMA_VERSION: &str = "schema_version";
const APPLICATION_ID: &str = "application_id";

const SETTINGS_DDL: &str = "CREATE SCHEMA IF NOT EXISTS sg_meta;
     CREATE TABLE IF NOT EXISTS sg_meta.settings (
         name  VARCHAR PRIMARY KEY,
         value BIGINT NOT NULL
     );";

fn settings_table_exists(conn: &Connection) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables \
         WHERE table_schema = 'sg_meta' AND table_name = 'settings'",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn read_setting(conn: &Connection, name: &str) -> DbResult<i64> {
    if !settings_table_exists(conn)? {
        return Ok(0);
    }
    let value: i64 = conn.query_row(
        "SELECT COALESCE(MAX(value), 0) FROM sg_meta.settings WHERE name = ?",
        duckdb::params![name],
        |row| row.get(0),
    )?;
    Ok(value)
}

fn write_setting(conn: &Connection, name: &str, value: i64) -> DbResult<()> {
    conn.execute_batch(SETTINGS_DDL)?;
    conn.execute(
        "INSERT INTO sg_meta.settings (name, value) VALUES (?, ?) \
         ON CONFLICT (name) DO UPDATE SET value = excluded.value",
        duckdb::params![name, value],
    )?;
    Ok(())
}

fn current_txid(conn: &Connection) -> DbResult<u64> {
    let txid: u64 = conn.query_row("SELECT txid_current()", [], |row| row.get(0))?;
    Ok(txid)
}

impl SchemaStore for Connection {
    fn backend_name(&self) -> &'static str {
        "duckdb"
    }

    fn schema_version(&self) -> DbResult<i64> {
        read_setting(self, SCHEMA_VERSION)
    }

    fn application_id(&self) -> DbResult<ApplicationId> {
        let raw = read_setting(self, APPLICATION_ID)?;
        ApplicationId::from_stored(raw).ok_or(DbError::ValueOutOfRange {
            setting: APPLICATION_ID,
            value: raw,
        })
    }

    fn set_application_id(&self, id: ApplicationId) -> DbResult<()> {
        write_setting(self, APPLICATION_ID, i64::from(id.get()))
    }

    fn begin(&mut self) -> DbResult<Box<dyn SchemaTransaction + '_>> {
        self.execute_batch("BEGIN TRANSACTION")?;
        let mut tx = DuckDbTransaction {
            conn: self,
            txid: 0,
            open: true,
        };
        tx.txid = current_txid(tx.conn)?;
        Ok(Box::new(tx))
    }

    fn interrupt_handle(&self) -> Option<InterruptFn> {
        let handle = Connection::interrupt_handle(self);
        Some(Box::new(move || handle.interrupt()))
    }
}

/// Migration transaction on a DuckDB connection; rolls back on drop.
struct DuckDbTransaction<'c> {
    conn: &'c Connection,
    txid: u64,
    open: bool,
}

impl SchemaTransaction for DuckDbTransaction<'_> {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.conn.execute_batch(sql)?;
        // A COMMIT/END/ROLLBACK inside the entry leaves later work on a
        // different transaction, or on none.
        if current_txid(self.conn)? != self.txid {
            return Err(DbError::TransactionEscaped);
        }
        Ok(())
    }

    fn set_schema_version(&mut self, version: i64) -> DbResult<()> {
        write_setting(self.conn, SCHEMA_VERSION, version)
    }

    fn commit(mut self: Box<Self>) -> DbResult<()> {
        self.open = false;
        if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(commit_err.into());
        }
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.open = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Drop for DuckDbTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::warn!("DuckDB rollback of abandoned migration transaction failed: {e}");
            }
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
