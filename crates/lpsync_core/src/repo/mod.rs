//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store operations layout passes depend on.
//! - Isolate SQLite query details from reconciliation logic.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`AnchorKeyNotFound`,
//!   `EntryNotFound`) in addition to store transport errors.

pub mod launchpad_repo;
