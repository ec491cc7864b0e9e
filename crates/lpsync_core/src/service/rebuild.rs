//! Container rebuild for one layout tree.
//!
//! # Responsibility
//! - Place every installed entry of a tree according to a layout document.
//! - Recreate the tree's anchors, pages, folders and folder inner pages.
//! - Suspend the store's ordering triggers for the length of a pass.
//!
//! # Invariants
//! - Installed entries missing from the document land on a trailing page.
//! - Container ids come from the threaded `IdAllocator` in traversal order:
//!   page, then per folder its root followed by its inner page.
//! - Unmatched and duplicate titles are reported and skipped; store write
//!   failures abort the pass.
//! - Every folder gets exactly one inner page.

use crate::model::item::{EntryRecord, ItemId, ItemKind, TreeKind};
use crate::model::layout::{Folder, LayoutTree};
use crate::repo::launchpad_repo::{LaunchpadRepository, NewContainer, RepoError};
use crate::service::allocator::IdAllocator;
use crate::service::missing::find_missing;
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort an export or import pass.
#[derive(Debug)]
pub enum SyncError {
    /// Store read/write failure.
    Repo(RepoError),
    /// The pass finished but triggers could not be switched back on.
    TriggerResume(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::TriggerResume(err) => {
                write!(f, "layout written but store triggers were not resumed: {err}")
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::TriggerResume(err) => Some(err),
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Why a document title was not placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// No installed entry carries the title.
    Unmatched,
    /// The title already appeared earlier in the same tree.
    Duplicate,
}

/// Recoverable placement problem for one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementIssue {
    pub title: String,
    pub kind: IssueKind,
}

/// Summary of one tree rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub tree: TreeKind,
    pub pages_created: usize,
    pub folders_created: usize,
    pub entries_placed: usize,
    /// Installed titles the document omitted, now on the trailing page.
    pub appended_missing: Vec<String>,
    pub issues: Vec<PlacementIssue>,
}

impl SyncReport {
    fn new(tree: TreeKind) -> Self {
        Self {
            tree,
            pages_created: 0,
            folders_created: 0,
            entries_placed: 0,
            appended_missing: Vec::new(),
            issues: Vec::new(),
        }
    }
}

/// Result of `Rebuilder::synchronize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Allocator advanced past every container created for the tree.
    pub allocator: IdAllocator,
    pub report: SyncReport,
}

/// Switches the store's ordering triggers off until dropped or resumed.
pub struct TriggerSuspension<'r, R: LaunchpadRepository> {
    repo: &'r R,
    active: bool,
}

impl<'r, R: LaunchpadRepository> TriggerSuspension<'r, R> {
    pub fn suspend(repo: &'r R) -> Result<Self, RepoError> {
        repo.set_triggers_suspended(true)?;
        info!("event=triggers_suspend module=service status=ok");
        Ok(Self { repo, active: true })
    }

    /// Re-enables triggers and reports failure to the caller.
    pub fn resume(mut self) -> Result<(), RepoError> {
        self.active = false;
        self.repo.set_triggers_suspended(false)?;
        info!("event=triggers_resume module=service status=ok");
        Ok(())
    }
}

impl<R: LaunchpadRepository> Drop for TriggerSuspension<'_, R> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        match self.repo.set_triggers_suspended(false) {
            Ok(()) => warn!("event=triggers_resume module=service status=ok path=abort"),
            Err(err) => error!(
                "event=triggers_resume module=service status=error path=abort error={}",
                err
            ),
        }
    }
}

/// Rebuilds the container hierarchy of one tree at a time.
pub struct Rebuilder<'r, R: LaunchpadRepository> {
    repo: &'r R,
}

impl<'r, R: LaunchpadRepository> Rebuilder<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Replaces the containers of `tree` with the layout in `document`.
    ///
    /// Entries of the tree's kind that `document` omits are appended on a new
    /// trailing page. Returns the advanced allocator with the report.
    ///
    /// # Errors
    /// Any store failure; the tree may then be left partially rebuilt.
    pub fn synchronize(
        &self,
        tree: TreeKind,
        document: &LayoutTree,
        allocator: IdAllocator,
    ) -> SyncResult<SyncOutcome> {
        let mut report = SyncReport::new(tree);
        let entries = self.repo.list_entries(tree)?;

        let mut layout = document.clone();
        let missing = find_missing(&entries, &layout);
        if !missing.is_empty() {
            let number = layout.append_page(missing.clone());
            info!(
                "event=sync_missing module=service status=appended tree={} page={} count={}",
                tree.as_str(),
                number,
                missing.len()
            );
            report.appended_missing = missing;
        }
        warn_on_sparse_numbers(tree, &layout);

        let anchors = self.repo.resolve_anchors(tree)?;
        let purged = self.repo.purge_tree_containers(anchors)?;
        self.repo.create_anchors(tree, anchors)?;
        debug!(
            "event=sync_purge module=service status=ok tree={} removed={} root={} holding={}",
            tree.as_str(),
            purged,
            anchors.root,
            anchors.holding
        );

        let mut placer = Placer {
            repo: self.repo,
            lookup: index_entries(&entries),
            seen: HashSet::new(),
            allocator,
            report,
        };

        for (page_index, page) in layout.pages.iter().enumerate() {
            let page_id =
                placer.create_container(anchors.root, page_index as i64, ItemKind::Page, None)?;
            placer.report.pages_created += 1;

            let mut ordering = 0;
            for title in &page.flat_items {
                placer.place_title(title, page_id, &mut ordering)?;
            }
            for folder in &page.folders {
                placer.place_folder(folder, page_id, &mut ordering)?;
            }
        }

        let Placer {
            allocator, report, ..
        } = placer;
        info!(
            "event=sync_tree module=service status=ok tree={} pages={} folders={} placed={} issues={} last_id={}",
            tree.as_str(),
            report.pages_created,
            report.folders_created,
            report.entries_placed,
            report.issues.len(),
            allocator.last()
        );
        Ok(SyncOutcome { allocator, report })
    }
}

struct Placer<'r, 'e, R: LaunchpadRepository> {
    repo: &'r R,
    lookup: HashMap<&'e str, Vec<ItemId>>,
    seen: HashSet<String>,
    allocator: IdAllocator,
    report: SyncReport,
}

impl<R: LaunchpadRepository> Placer<'_, '_, R> {
    fn create_container(
        &mut self,
        parent_id: ItemId,
        ordering: i64,
        kind: ItemKind,
        title: Option<&str>,
    ) -> SyncResult<ItemId> {
        let id = self.allocator.next_id();
        self.repo.create_container(&NewContainer {
            id,
            parent_id,
            ordering,
            kind,
            title,
        })?;
        Ok(id)
    }

    fn place_folder(
        &mut self,
        folder: &Folder,
        page_id: ItemId,
        ordering: &mut i64,
    ) -> SyncResult<()> {
        let folder_id = self.create_container(
            page_id,
            *ordering,
            ItemKind::FolderRoot,
            Some(folder.name.as_str()),
        )?;
        *ordering += 1;
        let inner_id = self.create_container(folder_id, 0, ItemKind::Page, None)?;
        self.report.folders_created += 1;

        if folder.pages.len() > 1 {
            warn!(
                "event=sync_folder module=service status=flattened tree={} folder={} pages={}",
                self.report.tree.as_str(),
                folder.name,
                folder.pages.len()
            );
        }

        let mut inner_ordering = 0;
        for title in folder.items() {
            self.place_title(title, inner_id, &mut inner_ordering)?;
        }
        Ok(())
    }

    fn place_title(
        &mut self,
        title: &str,
        parent_id: ItemId,
        ordering: &mut i64,
    ) -> SyncResult<()> {
        if !self.seen.insert(title.to_string()) {
            warn!(
                "event=sync_place module=service status=skipped reason=duplicate tree={} title={}",
                self.report.tree.as_str(),
                title
            );
            self.report.issues.push(PlacementIssue {
                title: title.to_string(),
                kind: IssueKind::Duplicate,
            });
            return Ok(());
        }

        let Some(ids) = self.lookup.get(title) else {
            warn!(
                "event=sync_place module=service status=skipped reason=unmatched tree={} title={}",
                self.report.tree.as_str(),
                title
            );
            self.report.issues.push(PlacementIssue {
                title: title.to_string(),
                kind: IssueKind::Unmatched,
            });
            return Ok(());
        };

        for &id in ids {
            self.repo.place_entry(id, parent_id, *ordering)?;
            *ordering += 1;
            self.report.entries_placed += 1;
        }
        Ok(())
    }
}

fn index_entries(entries: &[EntryRecord]) -> HashMap<&str, Vec<ItemId>> {
    let mut lookup: HashMap<&str, Vec<ItemId>> = HashMap::new();
    for entry in entries {
        lookup.entry(entry.title.as_str()).or_default().push(entry.id);
    }
    lookup
}

fn warn_on_sparse_numbers(tree: TreeKind, layout: &LayoutTree) {
    for (index, page) in layout.pages.iter().enumerate() {
        let expected = index as u32 + 1;
        if page.number != expected {
            warn!(
                "event=sync_validate module=service status=reordered tree={} page={} position={}",
                tree.as_str(),
                page.number,
                expected
            );
        }
    }
}
