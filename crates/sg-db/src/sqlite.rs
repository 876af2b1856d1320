//! SQLite backend.
//!
//! The two settings are the database header fields exposed as
//! `PRAGMA user_version` and `PRAGMA application_id`, both signed 32-bit and
//! zero in a new file. `user_version` written inside a transaction is rolled
//! back with it.

use crate::error::{DbError, DbResult};
use crate::traits::{InterruptFn, SchemaStore, SchemaTransaction};
use rusqlite::{Connection, Transaction};
use sg_core::ApplicationId;

const USER_VERSION: &str = "user_version";
const APPLICATION_ID: &str = "application_id";

fn read_pragma(conn: &Connection, name: &str) -> DbResult<i64> {
    let value = conn.pragma_query_value(None, name, |row| row.get::<_, i64>(0))?;
    Ok(value)
}

impl SchemaStore for Connection {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn schema_version(&self) -> DbResult<i64> {
        read_pragma(self, USER_VERSION)
    }

    fn application_id(&self) -> DbResult<ApplicationId> {
        let raw = read_pragma(self, APPLICATION_ID)?;
        ApplicationId::from_stored(raw).ok_or(DbError::ValueOutOfRange {
            setting: APPLICATION_ID,
            value: raw,
        })
    }

    fn set_application_id(&self, id: ApplicationId) -> DbResult<()> {
        self.pragma_update(None, APPLICATION_ID, id.get())?;
        Ok(())
    }

    fn begin(&mut self) -> DbResult<Box<dyn SchemaTransaction + '_>> {
        let tx = self.transaction()?;
        Ok(Box::new(SqliteTransaction { tx }))
    }

    fn interrupt_handle(&self) -> Option<InterruptFn> {
        let handle = self.get_interrupt_handle();
        Some(Box::new(move || handle.interrupt()))
    }
}

/// Migration transaction on a SQLite connection; rolls back on drop.
struct SqliteTransaction<'c> {
    tx: Transaction<'c>,
}

impl SchemaTransaction for SqliteTransaction<'_> {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.tx.execute_batch(sql)?;
        // A COMMIT/END/ROLLBACK inside the entry would leave later entries
        // outside the transaction.
        if self.tx.is_autocommit() {
            return Err(DbError::TransactionEscaped);
        }
        Ok(())
    }

    fn set_schema_version(&mut self, version: i64) -> DbResult<()> {
        let version = i32::try_from(version).map_err(|_| DbError::ValueOutOfRange {
            setting: USER_VERSION,
            value: version,
        })?;
        self.tx.pragma_update(None, USER_VERSION, version)?;
        Ok(())
    }

    fn commit(self: Box<Self>) -> DbResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> DbResult<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
