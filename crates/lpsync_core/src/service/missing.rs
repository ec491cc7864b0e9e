//! Missing-entry detection for one tree.

use crate::model::item::EntryRecord;
use crate::model::layout::LayoutTree;
use std::collections::HashSet;

/// Returns installed titles the document never mentions, in store order.
///
/// Titles shared by several installed entries are reported once.
pub fn find_missing(installed: &[EntryRecord], document: &LayoutTree) -> Vec<String> {
    let referenced: HashSet<&str> = document.titles().collect();
    let mut reported = HashSet::new();
    installed
        .iter()
        .map(|entry| entry.title.as_str())
        .filter(|title| !referenced.contains(title) && reported.insert(*title))
        .map(str::to_string)
        .collect()
}
