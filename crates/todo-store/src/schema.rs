//! The `tasks` table.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// DDL for the single table. Safe to run on every start.
pub const CREATE_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    title       TEXT    NOT NULL,
    description TEXT    NOT NULL,
    addedOn     INTEGER NOT NULL,
    dueBy       INTEGER NOT NULL,
    status      TEXT    NOT NULL
);";

/// Create the `tasks` table if it does not exist, inside one transaction.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StoreError::Schema {
            message: format!("failed to begin transaction: {e}"),
        })?;

    tx.execute_batch(CREATE_TASKS)
        .map_err(|e| StoreError::Schema {
            message: format!("failed to create tasks table: {e}"),
        })?;

    tx.commit().map_err(|e| StoreError::Schema {
        message: format!("failed to commit schema: {e}"),
    })?;

    Ok(())
}
