//! Per-run, per-category acceptance limits.

use crate::models::Category;

/// Counters for one run. Never persisted, so every run starts at zero.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    max_per_category: u32,
    counts: [u32; Category::ALL.len()],
}

impl QuotaTracker {
    pub fn new(max_per_category: u32) -> Self {
        Self {
            max_per_category,
            counts: [0; Category::ALL.len()],
        }
    }

    /// Claim a slot for `category`.
    ///
    /// Returns `false` and leaves the counters untouched once the category
    /// is full.
    pub fn try_accept(&mut self, category: Category) -> bool {
        let count = &mut self.counts[category.index()];
        if *count < self.max_per_category {
            *count += 1;
            true
        } else {
            false
        }
    }

    pub fn count(&self, category: Category) -> u32 {
        self.counts[category.index()]
    }
}
