//! Launcher store schema fixture and readiness checks.
//!
//! # Responsibility
//! - Describe which tables/columns layout passes read and write.
//! - Install a faithful schema fixture for tests and local experiments.
//!
//! # Invariants
//! - The fixture mirrors the launcher's anchors, trigger switch and
//!   ordering triggers; it never holds entries.

use super::{StoreError, StoreResult};
use rusqlite::Connection;

const LAUNCHPAD_SCHEMA: &str = include_str!("launchpad_schema.sql");

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("dbinfo", &["key", "value"]),
    (
        "items",
        &["rowid", "uuid", "flags", "type", "parent_id", "ordering"],
    ),
    ("apps", &["item_id", "title"]),
    ("widgets", &["item_id", "title"]),
    ("groups", &["item_id", "category_id", "title"]),
];

/// Installs the launcher schema fixture on an empty connection.
pub fn install_launchpad_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(LAUNCHPAD_SCHEMA)?;
    Ok(())
}

/// Verifies every table and column the layout engine touches exists.
pub fn ensure_store_ready(conn: &Connection) -> StoreResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(StoreError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
