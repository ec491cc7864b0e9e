//! Core layout synchronization for the launcher store.
//! Export turns the store's item rows into a layout document; import
//! rebuilds the store's container hierarchy from one.

pub mod db;
pub mod document;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_store, open_store_in_memory, StoreError, StoreResult};
pub use document::{load_document, save_document, DocumentError, DocumentFormat};
pub use logging::{default_log_level, init_logging, LogTarget, LoggingError};
pub use model::item::{EntryRecord, ItemId, ItemKind, LayoutRow, TreeAnchors, TreeKind};
pub use model::layout::{Folder, FolderPage, LayoutDocument, LayoutTree, Page};
pub use repo::launchpad_repo::{
    LaunchpadRepository, NewContainer, RepoError, RepoResult, SqliteLaunchpadRepository,
};
pub use service::allocator::IdAllocator;
pub use service::extract::{extract_tree, ParentIndex};
pub use service::layout_service::{ImportReport, LayoutService};
pub use service::missing::find_missing;
pub use service::rebuild::{
    IssueKind, PlacementIssue, Rebuilder, SyncError, SyncOutcome, SyncReport, SyncResult,
    TriggerSuspension,
};

