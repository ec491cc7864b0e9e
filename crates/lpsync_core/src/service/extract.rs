//! Tree extraction: flat layout rows to a layout document.
//!
//! # Responsibility
//! - Index rows by parent in store ordering.
//! - Rebuild the page/folder/entry shape of one tree.
//!
//! # Invariants
//! - Page numbers are dense and 1-based.
//! - Flat and folder ordering mirror `items.ordering`.
//! - A folder is read through its first inner page only; further inner
//!   pages are logged and ignored.
//! - Unknown row kinds are logged and skipped, never fatal.

use crate::model::item::{ItemId, ItemKind, LayoutRow};
use crate::model::layout::{Folder, FolderPage, LayoutTree, Page};
use log::{debug, warn};
use std::collections::HashMap;

/// Children of every parent, in ascending ordering.
#[derive(Debug, Default)]
pub struct ParentIndex {
    children: HashMap<ItemId, Vec<LayoutRow>>,
}

impl ParentIndex {
    pub fn from_rows(rows: impl IntoIterator<Item = LayoutRow>) -> Self {
        let mut children: HashMap<ItemId, Vec<LayoutRow>> = HashMap::new();
        for row in rows {
            children.entry(row.parent_id).or_default().push(row);
        }
        for siblings in children.values_mut() {
            siblings.sort_by_key(|row| (row.ordering, row.id));
        }
        Self { children }
    }

    pub fn children(&self, parent_id: ItemId) -> &[LayoutRow] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Builds the layout of the tree hanging off `root`.
pub fn extract_tree(root: ItemId, index: &ParentIndex) -> LayoutTree {
    let mut tree = LayoutTree::default();

    for (position, page_row) in index.children(root).iter().enumerate() {
        let mut page = Page {
            number: position as u32 + 1,
            ..Page::default()
        };
        debug!(
            "event=extract_page module=service status=ok page={} id={}",
            page.number, page_row.id
        );

        for item in index.children(page_row.id) {
            match item.kind {
                ItemKind::Application | ItemKind::Widget => {
                    page.flat_items.push(item.display_title().to_string());
                }
                ItemKind::FolderRoot => {
                    page.folders.push(extract_folder(item, index));
                }
                ItemKind::Root | ItemKind::Page => {
                    warn!(
                        "event=extract_item module=service status=skipped reason=unexpected_container id={} kind={}",
                        item.id,
                        item.kind.code()
                    );
                }
                ItemKind::Unknown(code) => {
                    warn!(
                        "event=extract_item module=service status=skipped reason=unknown_kind id={} kind={}",
                        item.id, code
                    );
                }
            }
        }

        tree.pages.push(page);
    }

    tree
}

fn extract_folder(folder: &LayoutRow, index: &ParentIndex) -> Folder {
    let mut items = Vec::new();
    let inner_pages = index.children(folder.id);
    if inner_pages.len() > 1 {
        warn!(
            "event=extract_folder module=service status=partial reason=multiple_inner_pages id={} inner_pages={}",
            folder.id,
            inner_pages.len()
        );
    }

    if let Some(inner) = inner_pages.first() {
        for item in index.children(inner.id) {
            match item.kind {
                ItemKind::Application | ItemKind::Widget => {
                    items.push(item.display_title().to_string());
                }
                other => {
                    warn!(
                        "event=extract_item module=service status=skipped reason=unexpected_in_folder id={} kind={}",
                        item.id,
                        other.code()
                    );
                }
            }
        }
    }

    Folder {
        name: folder.display_title().to_string(),
        pages: vec![FolderPage { number: 1, items }],
    }
}
