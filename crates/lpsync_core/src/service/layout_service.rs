//! Export/import use-case service.
//!
//! # Responsibility
//! - Export both launcher trees as one layout document.
//! - Run a full import pass: suspend triggers, clear containers, rebuild
//!   apps then widgets with one threaded allocator, resume triggers.
//!
//! # Invariants
//! - Triggers are switched back on on every exit path once suspended.
//! - Allocation starts above the highest app or widget id.
//! - No transaction spans the pass; a failure mid-rebuild leaves the
//!   store partially rebuilt.

use crate::model::item::TreeKind;
use crate::model::layout::LayoutDocument;
use crate::repo::launchpad_repo::LaunchpadRepository;
use crate::service::allocator::IdAllocator;
use crate::service::extract::{extract_tree, ParentIndex};
use crate::service::rebuild::{Rebuilder, SyncError, SyncReport, SyncResult, TriggerSuspension};
use log::{error, info};
use std::time::Instant;

/// Summary of a full import pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub apps: SyncReport,
    pub widgets: SyncReport,
    /// Highest container id allocated during the pass.
    pub last_allocated_id: i64,
}

impl ImportReport {
    pub fn tree(&self, kind: TreeKind) -> &SyncReport {
        match kind {
            TreeKind::Apps => &self.apps,
            TreeKind::Widgets => &self.widgets,
        }
    }
}

/// Layout export/import facade.
pub struct LayoutService<R: LaunchpadRepository> {
    repo: R,
}

impl<R: LaunchpadRepository> LayoutService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reads the current layout of both trees.
    pub fn export_layout(&self) -> SyncResult<LayoutDocument> {
        let started_at = Instant::now();
        let rows = self.repo.load_layout_rows()?;
        let row_count = rows.len();
        let index = ParentIndex::from_rows(rows);

        let mut document = LayoutDocument::default();
        for tree in TreeKind::ALL {
            let anchors = self.repo.resolve_anchors(tree)?;
            *document.tree_mut(tree) = extract_tree(anchors.root, &index);
        }

        info!(
            "event=layout_export module=service status=ok duration_ms={} rows={} app_pages={} widget_pages={}",
            started_at.elapsed().as_millis(),
            row_count,
            document.apps.pages.len(),
            document.widgets.pages.len()
        );
        Ok(document)
    }

    /// Replaces the store layout with `document`.
    ///
    /// # Errors
    /// - `SyncError::Repo` when any store read/write fails; triggers are
    ///   still resumed.
    /// - `SyncError::TriggerResume` when the rebuild succeeded but the
    ///   trigger switch could not be reset.
    pub fn import_layout(&self, document: &LayoutDocument) -> SyncResult<ImportReport> {
        let started_at = Instant::now();
        info!("event=layout_import module=service status=start");

        let suspension = TriggerSuspension::suspend(&self.repo)?;
        let report = match self.rebuild_all(document) {
            Ok(report) => report,
            Err(err) => {
                error!(
                    "event=layout_import module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                drop(suspension);
                return Err(err);
            }
        };
        suspension.resume().map_err(SyncError::TriggerResume)?;

        info!(
            "event=layout_import module=service status=ok duration_ms={} last_id={}",
            started_at.elapsed().as_millis(),
            report.last_allocated_id
        );
        Ok(report)
    }

    fn rebuild_all(&self, document: &LayoutDocument) -> SyncResult<ImportReport> {
        // Anchor problems must surface before anything is deleted.
        for tree in TreeKind::ALL {
            self.repo.resolve_anchors(tree)?;
        }

        // Both trees allocate from one id space, so no stale container may
        // survive into either tree's rebuild.
        let cleared = self.repo.clear_containers()?;
        info!("event=layout_clear module=service status=ok removed={cleared}");

        let highest_entry = self
            .repo
            .max_entry_id(TreeKind::Apps)?
            .max(self.repo.max_entry_id(TreeKind::Widgets)?);
        let allocator = IdAllocator::starting_after(highest_entry);

        let rebuilder = Rebuilder::new(&self.repo);
        let apps = rebuilder.synchronize(TreeKind::Apps, &document.apps, allocator)?;
        let widgets =
            rebuilder.synchronize(TreeKind::Widgets, &document.widgets, apps.allocator)?;

        Ok(ImportReport {
            apps: apps.report,
            widgets: widgets.report,
            last_allocated_id: widgets.allocator.last(),
        })
    }
}
