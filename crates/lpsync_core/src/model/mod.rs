//! Launcher layout domain model.
//!
//! # Responsibility
//! - Define the row-level view of the launcher store (`item`).
//! - Define the declarative, store-agnostic layout document (`layout`).
//!
//! # Invariants
//! - Entry identifiers are assigned by the launcher and never rewritten.
//! - Apps and widgets are independent title namespaces.

pub mod item;
pub mod layout;
