//! SQLite store bootstrap and schema readiness entry points.
//!
//! # Responsibility
//! - Open and configure connections to the launcher store.
//! - Verify the tables and columns layout synchronization depends on.
//!
//! # Invariants
//! - The store file is owned by the launcher; it is never created here.
//! - Core code must not read/write layout rows before readiness succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod locate;
mod open;
pub mod schema;

pub use locate::{backup_store, default_store_path};
pub use open::{open_store, open_store_in_memory};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Store file does not exist at the resolved path.
    StoreNotFound(PathBuf),
    /// File-level failure while copying or probing the store.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Environment does not provide enough to resolve a default store path.
    Unresolvable(&'static str),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::StoreNotFound(path) => {
                write!(f, "launcher store not found: {}", path.display())
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Unresolvable(reason) => {
                write!(f, "cannot resolve launcher store path: {reason}")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "launcher store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "launcher store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::StoreNotFound(_) => None,
            Self::Unresolvable(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
