//! Container identifier allocation.

use crate::model::item::ItemId;

/// Hands out container ids above every entry id.
///
/// The allocator is a plain value: rebuild steps take it, advance it and
/// hand it back, so the next tree continues where the previous one ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    last: ItemId,
}

impl IdAllocator {
    /// Starts allocation right after `highest` (the largest entry id).
    pub fn starting_after(highest: ItemId) -> Self {
        Self { last: highest }
    }

    /// Returns the next unused id and advances the counter.
    pub fn next_id(&mut self) -> ItemId {
        self.last += 1;
        self.last
    }

    /// Last id handed out, or the seed when nothing was allocated yet.
    pub fn last(&self) -> ItemId {
        self.last
    }
}
