//! Row-level model of the launcher `items` hierarchy.
//!
//! # Responsibility
//! - Map the integer type discriminant onto a closed set of variants.
//! - Describe per-tree constants (anchor uuids, root keys, entry tables).
//!
//! # Invariants
//! - Unrecognized discriminants stay representable as `ItemKind::Unknown`
//!   so consumers can log and skip them.

/// Launcher-wide row identifier (`items.rowid`).
///
/// Entries and containers share this identifier space.
pub type ItemId = i64;

/// Type discriminant stored in `items.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Anchor row (root or holding page).
    Root,
    /// Folder container; its title lives in `groups`.
    FolderRoot,
    /// Page container, either top-level or a folder's inner page.
    Page,
    /// Installed application entry.
    Application,
    /// Installed widget entry.
    Widget,
    /// Any discriminant the engine does not understand.
    Unknown(i64),
}

impl ItemKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Root,
            2 => Self::FolderRoot,
            3 => Self::Page,
            4 => Self::Application,
            6 => Self::Widget,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Root => 1,
            Self::FolderRoot => 2,
            Self::Page => 3,
            Self::Application => 4,
            Self::Widget => 6,
            Self::Unknown(code) => code,
        }
    }

    /// Returns true for synthetic rows rebuilt on every import pass.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Root | Self::FolderRoot | Self::Page)
    }
}

/// One of the two independent layout trees kept by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Apps,
    Widgets,
}

impl TreeKind {
    /// Synchronization order used by an import pass.
    pub const ALL: [TreeKind; 2] = [TreeKind::Apps, TreeKind::Widgets];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apps => "apps",
            Self::Widgets => "widgets",
        }
    }

    /// Row type of the entries placed in this tree.
    pub fn entry_kind(self) -> ItemKind {
        match self {
            Self::Apps => ItemKind::Application,
            Self::Widgets => ItemKind::Widget,
        }
    }

    /// `dbinfo` key holding the root anchor id.
    pub fn root_key(self) -> &'static str {
        match self {
            Self::Apps => "launchpad_root",
            Self::Widgets => "dashboard_root",
        }
    }

    /// `items.uuid` values of the root and holding anchors.
    pub fn anchor_uuids(self) -> (&'static str, &'static str) {
        match self {
            Self::Apps => ("ROOTPAGE", "HOLDINGPAGE"),
            Self::Widgets => ("ROOTPAGE_DB", "HOLDINGPAGE_DB"),
        }
    }
}

/// Every `items.uuid` value reserved for anchor rows, in both trees and the
/// launcher's version bookkeeping.
pub const ANCHOR_UUIDS: &[&str] = &[
    "ROOTPAGE",
    "HOLDINGPAGE",
    "ROOTPAGE_DB",
    "HOLDINGPAGE_DB",
    "ROOTPAGE_VERS",
    "HOLDINGPAGE_VERS",
];

/// Anchor pair one tree descends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeAnchors {
    pub root: ItemId,
    pub holding: ItemId,
}

/// One `items` row joined with its title payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    pub id: ItemId,
    pub parent_id: ItemId,
    pub ordering: i64,
    pub kind: ItemKind,
    /// App/widget title, or folder title for folder roots.
    pub title: Option<String>,
}

impl LayoutRow {
    /// Title used in layout documents; untitled rows render as empty.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Installed app or widget as seen by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub id: ItemId,
    pub title: String,
}
