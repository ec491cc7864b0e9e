//! Declarative layout document.
//!
//! # Responsibility
//! - Represent pages, folders and entry titles independent of storage.
//! - Provide the serde shape persisted by the document codec.
//!
//! # Invariants
//! - Page numbers produced by export are dense and 1-based.
//! - Folders are exported with exactly one inner page.

use super::item::TreeKind;
use serde::{Deserialize, Serialize};

/// Both launcher trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDocument {
    #[serde(default)]
    pub apps: LayoutTree,
    #[serde(default)]
    pub widgets: LayoutTree,
}

impl LayoutDocument {
    pub fn tree(&self, kind: TreeKind) -> &LayoutTree {
        match kind {
            TreeKind::Apps => &self.apps,
            TreeKind::Widgets => &self.widgets,
        }
    }

    pub fn tree_mut(&mut self, kind: TreeKind) -> &mut LayoutTree {
        match kind {
            TreeKind::Apps => &mut self.apps,
            TreeKind::Widgets => &mut self.widgets,
        }
    }
}

/// Ordered pages of one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTree {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl LayoutTree {
    /// Iterates every title in document order: per page, flat items first,
    /// then folder items.
    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.pages.iter().flat_map(|page| {
            page.flat_items.iter().map(String::as_str).chain(
                page.folders
                    .iter()
                    .flat_map(|folder| folder.items().map(String::as_str)),
            )
        })
    }

    /// Appends a trailing page holding `items` and returns its number.
    pub fn append_page(&mut self, items: Vec<String>) -> u32 {
        // Numbers come from user documents; the last one may already be u32::MAX.
        let number = self
            .pages
            .last()
            .map_or(1, |page| page.number.saturating_add(1));
        self.pages.push(Page {
            number,
            flat_items: items,
            folders: Vec::new(),
        });
        number
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flat_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    #[serde(default)]
    pub pages: Vec<FolderPage>,
}

impl Folder {
    /// Every title across the folder's pages, in order.
    pub fn items(&self) -> impl Iterator<Item = &String> + '_ {
        self.pages.iter().flat_map(|page| page.items.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderPage {
    pub number: u32,
    #[serde(default)]
    pub items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{Folder, FolderPage, LayoutTree, Page};

    fn tree() -> LayoutTree {
        LayoutTree {
            pages: vec![Page {
                number: 1,
                flat_items: vec!["Safari".to_string()],
                folders: vec![Folder {
                    name: "Utils".to_string(),
                    pages: vec![FolderPage {
                        number: 1,
                        items: vec!["Calc".to_string(), "Notes".to_string()],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn titles_visit_flat_items_before_folders() {
        let t = tree();
        let titles: Vec<&str> = t.titles().collect();
        assert_eq!(titles, vec!["Safari", "Calc", "Notes"]);
    }

    #[test]
    fn append_page_follows_last_page_number() {
        let mut tree = tree();
        tree.pages[0].number = 4;
        let number = tree.append_page(vec!["Maps".to_string()]);
        assert_eq!(number, 5);
        assert_eq!(tree.pages[1].flat_items, vec!["Maps".to_string()]);
    }

    #[test]
    fn append_page_after_max_number_does_not_overflow() {
        let mut tree = tree();
        tree.pages[0].number = u32::MAX;
        assert_eq!(tree.append_page(vec!["Maps".to_string()]), u32::MAX);
        assert_eq!(tree.pages.len(), 2);
    }

    #[test]
    fn append_page_on_empty_tree_starts_at_one() {
        let mut tree = LayoutTree::default();
        assert_eq!(tree.append_page(Vec::new()), 1);
    }
}
