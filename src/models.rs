//! Data models shared by the crawler, the run orchestrator and the notifier.
//!
//! - [`Source`]: one configured site and the pages polled for it
//! - [`Candidate`]: an extracted `(title, link)` pair, alive for one run
//! - [`Category`]: the closed set of announcement kinds
//! - [`AcceptedItem`]: a candidate that passed dedup and quota checks

use serde::{Deserialize, Serialize};
use std::fmt;

/// A configured site.
///
/// `id` is what reports show as the source of an item; `urls` are the pages
/// scanned for anchors, in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    /// Short display name, unique across the configuration.
    pub id: String,
    /// Absolute page URLs to fetch.
    pub urls: Vec<String>,
}

/// An anchor pulled from a source page before any decision is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Visible anchor text.
    pub raw_title: String,
    /// The page the anchor was found on.
    pub source_page_url: String,
    /// `href` resolved against the page URL.
    pub resolved_link: String,
}

/// Kind of announcement, derived from the title only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    AnswerKey,
    Result,
    AdmitCard,
    LatestJob,
}

impl Category {
    /// Every category, in categorizer priority order.
    pub const ALL: [Category; 4] = [
        Category::AnswerKey,
        Category::Result,
        Category::AdmitCard,
        Category::LatestJob,
    ];

    /// Human label. Also part of the fingerprint key, so it must never change
    /// for an existing category or previously seen items come back.
    pub fn label(self) -> &'static str {
        match self {
            Category::AnswerKey => "Answer Key",
            Category::Result => "Result",
            Category::AdmitCard => "Admit Card",
            Category::LatestJob => "Latest Job",
        }
    }

    /// Dense index for per-category counters.
    pub(crate) fn index(self) -> usize {
        match self {
            Category::AnswerKey => 0,
            Category::Result => 1,
            Category::AdmitCard => 2,
            Category::LatestJob => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Notification-ready projection of a candidate.
///
/// Only its fingerprint outlives the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedItem {
    pub title: String,
    pub category: Category,
    pub source_id: String,
    /// Discovery date, `DD-MM-YYYY`.
    pub date: String,
    pub link: String,
}
