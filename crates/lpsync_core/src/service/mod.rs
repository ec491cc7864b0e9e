//! Layout synchronization services.
//!
//! # Responsibility
//! - Extract layout documents from store rows (export path).
//! - Reconcile documents against installed entries and rebuild containers
//!   (import path).
//! - Keep CLI layers decoupled from storage details.

pub mod allocator;
pub mod extract;
pub mod layout_service;
pub mod missing;
pub mod rebuild;
