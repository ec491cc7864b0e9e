//! Connection bootstrap utilities for the launcher store.
//!
//! # Responsibility
//! - Open an existing store file or an in-memory fixture store.
//! - Configure connection settings required by layout passes.
//! - Check schema readiness before returning a usable connection.
//!
//! # Invariants
//! - File stores are opened read-write without the create flag.
//! - Returned connections passed `ensure_store_ready`.

use super::schema::{ensure_store_ready, install_launchpad_schema};
use super::{StoreError, StoreResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the launcher store file and verifies its schema.
///
/// # Errors
/// - `StoreError::StoreNotFound` when nothing exists at `path`.
/// - Readiness errors when a required table or column is absent.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=store_open module=db status=start mode=file path={}",
        path.display()
    );

    if !path.is_file() {
        error!(
            "event=store_open module=db status=error mode=file error_code=store_not_found path={}",
            path.display()
        );
        return Err(StoreError::StoreNotFound(path.to_path_buf()));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=file duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=file duration_ms={} error_code=store_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory store seeded with the launcher schema fixture.
///
/// The fixture holds anchors and the trigger switch but no entries.
pub fn open_store_in_memory() -> StoreResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=memory");

    let conn = Connection::open_in_memory()?;
    let result = install_launchpad_schema(&conn).and_then(|()| bootstrap_connection(&conn));
    match result {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=memory duration_ms={} error_code=store_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    ensure_store_ready(conn)
}
