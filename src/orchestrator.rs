//! One watch run, start to finish.
//!
//! ```text
//! load seen set -> crawl pages -> decide per candidate -> notify -> save seen set
//! ```
//!
//! Per candidate, in order:
//!
//! 1. drop titles shorter than the configured minimum
//! 2. categorize
//! 3. fingerprint `(normalized title, category)`
//! 4. drop if the fingerprint is already seen
//! 5. drop if the category quota is used up, *without* marking it seen, so it
//!    can still be reported by a later run
//! 6. accept: mark seen for the rest of the run, take a quota slot, queue for
//!    the report
//!
//! Fetching may run concurrently, but decisions are made one candidate at a
//! time on this task, so the seen set and quota counters need no locking.
//!
//! Fingerprints accepted during the run are staged and only merged into the
//! seen set once the report is delivered. If delivery fails they are dropped,
//! so those items come back on the next run instead of vanishing unreported.
//! Either way the seen set is saved exactly once, after notification.

use crate::categorizer::categorize;
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::fingerprint::{Fingerprint, fingerprint, normalize};
use crate::models::{AcceptedItem, Candidate, Category};
use crate::outputs::Notifier;
use crate::quota::QuotaTracker;
use crate::scrapers::{Crawler, crawl_sources};
use crate::store::SeenStore;
use crate::utils::{run_date, truncate_for_log};
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, trace, warn};

/// Outcome of the decision pass for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    TooShort,
    Duplicate(Category),
    OverQuota(Category),
    Accepted(Category),
}

/// What happened to the notification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyStatus {
    /// Nothing new, nothing sent.
    Skipped,
    Sent,
    Failed(String),
}

/// Counters and accepted items of a finished run.
#[derive(Debug)]
pub struct RunSummary {
    pub pages: usize,
    pub failed_pages: usize,
    pub candidates: usize,
    pub too_short: usize,
    pub duplicates: usize,
    pub over_quota: usize,
    pub accepted: Vec<AcceptedItem>,
    pub notify: NotifyStatus,
    pub seen_total: usize,
}

/// Mutable per-run decision state.
///
/// Reads the loaded seen set; owns the quota counters (so they start from
/// zero every time) and the fingerprints accepted so far.
#[derive(Debug)]
pub struct Decider<'a> {
    seen: &'a SeenStore,
    pending: HashSet<Fingerprint>,
    quota: QuotaTracker,
    min_title_len: usize,
    date: String,
    accepted: Vec<AcceptedItem>,
}

impl<'a> Decider<'a> {
    pub fn new(seen: &'a SeenStore, config: &AppConfig, date: String) -> Self {
        Self {
            seen,
            pending: HashSet::new(),
            quota: QuotaTracker::new(config.max_per_category),
            min_title_len: config.min_title_len,
            date,
            accepted: Vec::new(),
        }
    }

    /// Run the decision rule for one candidate found on `source_id`.
    pub fn decide(&mut self, source_id: &str, candidate: Candidate) -> Decision {
        if candidate.raw_title.chars().count() < self.min_title_len {
            return Decision::TooShort;
        }

        let category = categorize(&candidate.raw_title);
        let fp = fingerprint(&normalize(&candidate.raw_title), category);

        if self.seen.contains(&fp) || self.pending.contains(&fp) {
            return Decision::Duplicate(category);
        }
        if !self.quota.try_accept(category) {
            return Decision::OverQuota(category);
        }

        self.pending.insert(fp);
        self.accepted.push(AcceptedItem {
            title: candidate.raw_title,
            category,
            source_id: source_id.to_string(),
            date: self.date.clone(),
            link: candidate.resolved_link,
        });
        Decision::Accepted(category)
    }

    /// Accepted items in discovery order, plus their fingerprints.
    pub fn finish(self) -> (Vec<AcceptedItem>, HashSet<Fingerprint>) {
        for category in Category::ALL {
            debug!(%category, accepted = self.quota.count(category), "Quota usage");
        }
        (self.accepted, self.pending)
    }
}

/// Execute one run against `crawler` and `notifier`.
///
/// # Errors
///
/// Only [`StoreError`]: the seen file exists but cannot be read (checked
/// before crawling, so an unreadable history is never overwritten), or the
/// final save fails. Fetch and notification failures are logged and
/// reflected in the summary.
#[instrument(level = "info", skip_all, fields(seen_file = %config.seen_file.display()))]
pub async fn run<C, N>(config: &AppConfig, crawler: &C, notifier: &N) -> Result<RunSummary, StoreError>
where
    C: Crawler,
    N: Notifier,
{
    let mut store = SeenStore::load(&config.seen_file).await?;

    let pages = crawl_sources(crawler, &config.sources, config.fetch.concurrency).await;

    let mut summary = RunSummary {
        pages: pages.len(),
        failed_pages: 0,
        candidates: 0,
        too_short: 0,
        duplicates: 0,
        over_quota: 0,
        accepted: Vec::new(),
        notify: NotifyStatus::Skipped,
        seen_total: 0,
    };

    let mut decider = Decider::new(&store, config, run_date());
    for page in pages {
        let candidates = match page.result {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(source = %page.source.id, page = %page.page_url, error = %e, "Fetch failed; skipping page");
                summary.failed_pages += 1;
                continue;
            }
        };

        for candidate in candidates {
            summary.candidates += 1;
            let title = truncate_for_log(&candidate.raw_title, 80);
            trace!(%title, page = %candidate.source_page_url, "Considering candidate");
            match decider.decide(&page.source.id, candidate) {
                Decision::TooShort => summary.too_short += 1,
                Decision::Duplicate(category) => {
                    debug!(%title, %category, "Already seen");
                    summary.duplicates += 1;
                }
                Decision::OverQuota(category) => {
                    debug!(%title, %category, "Category quota reached; leaving for a later run");
                    summary.over_quota += 1;
                }
                Decision::Accepted(category) => {
                    info!(%title, %category, source = %page.source.id, "New item");
                }
            }
        }
    }
    let (accepted, pending) = decider.finish();
    summary.accepted = accepted;

    info!(
        pages = summary.pages,
        failed_pages = summary.failed_pages,
        candidates = summary.candidates,
        too_short = summary.too_short,
        duplicates = summary.duplicates,
        over_quota = summary.over_quota,
        accepted = summary.accepted.len(),
        "Decision pass complete"
    );

    if !summary.accepted.is_empty() {
        summary.notify = match notifier.notify(&summary.accepted).await {
            Ok(()) => {
                info!(count = summary.accepted.len(), "Notification delivered");
                for fp in pending {
                    store.add(fp);
                }
                NotifyStatus::Sent
            }
            Err(e) => {
                error!(
                    error = %e,
                    count = pending.len(),
                    "Notification failed; items will be offered again next run"
                );
                NotifyStatus::Failed(e.to_string())
            }
        };
    }

    store.save().await?;
    summary.seen_total = store.len();

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Delivery, FetchConfig};
    use crate::error::{FetchError, NotifyError};
    use crate::models::Source;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Serves canned anchor texts per page URL.
    #[derive(Default)]
    struct FakeCrawler {
        pages: HashMap<String, Vec<String>>,
        broken: Vec<String>,
    }

    impl FakeCrawler {
        fn page(mut self, url: &str, titles: &[&str]) -> Self {
            self.pages
                .insert(url.to_string(), titles.iter().map(|t| t.to_string()).collect());
            self
        }

        fn broken(mut self, url: &str) -> Self {
            self.broken.push(url.to_string());
            self
        }
    }

    impl Crawler for FakeCrawler {
        async fn fetch_candidates(&self, page_url: &str) -> Result<Vec<Candidate>, FetchError> {
            if self.broken.iter().any(|u| u == page_url) {
                return Err(FetchError::Status {
                    url: page_url.to_string(),
                    status: 502,
                });
            }
            Ok(self
                .pages
                .get(page_url)
                .into_iter()
                .flatten()
                .enumerate()
                .map(|(i, title)| Candidate {
                    raw_title: title.clone(),
                    source_page_url: page_url.to_string(),
                    resolved_link: format!("{page_url}item/{i}"),
                })
                .collect())
        }
    }

    /// Records every batch; optionally fails delivery.
    #[derive(Default)]
    struct FakeNotifier {
        batches: RefCell<Vec<Vec<AcceptedItem>>>,
        fail: bool,
    }

    impl Notifier for FakeNotifier {
        async fn notify(&self, items: &[AcceptedItem]) -> Result<(), NotifyError> {
            self.batches.borrow_mut().push(items.to_vec());
            if self.fail {
                Err(NotifyError::Io(std::io::Error::other("relay down")))
            } else {
                Ok(())
            }
        }
    }

    fn config(seen_file: &Path, sources: Vec<Source>, max_per_category: u32) -> AppConfig {
        AppConfig {
            sources,
            seen_file: seen_file.to_path_buf(),
            max_per_category,
            min_title_len: 12,
            fetch: FetchConfig {
                user_agent: "test".to_string(),
                timeout: Duration::from_secs(1),
                concurrency: 2,
            },
            delivery: Delivery::DryRun,
            greeting_name: None,
            json_report: None,
        }
    }

    fn source(id: &str, url: &str) -> Source {
        Source {
            id: id.to_string(),
            urls: vec![url.to_string()],
        }
    }

    const BOARD_A: &str = "https://a.example/";
    const BOARD_B: &str = "https://b.example/";

    #[tokio::test]
    async fn test_two_sources_then_rerun_accepts_nothing() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        let config = config(
            &seen_file,
            vec![source("BoardA", BOARD_A), source("BoardB", BOARD_B)],
            10,
        );
        let crawler = FakeCrawler::default()
            .page(BOARD_A, &["XYZ Board Result 2024 Out"])
            .page(BOARD_B, &["XYZ Board Admit Card 2024 Released"]);

        let notifier = FakeNotifier::default();
        let first = run(&config, &crawler, &notifier).await.unwrap();
        assert_eq!(first.accepted.len(), 2);
        assert_eq!(first.accepted[0].category, Category::Result);
        assert_eq!(first.accepted[0].source_id, "BoardA");
        assert_eq!(first.accepted[1].category, Category::AdmitCard);
        assert_eq!(first.accepted[1].source_id, "BoardB");
        assert_eq!(first.notify, NotifyStatus::Sent);
        assert_eq!(notifier.batches.borrow().len(), 1);

        let notifier = FakeNotifier::default();
        let second = run(&config, &crawler, &notifier).await.unwrap();
        assert!(second.accepted.is_empty());
        assert_eq!(second.duplicates, 2);
        assert_eq!(second.notify, NotifyStatus::Skipped);
        assert!(notifier.batches.borrow().is_empty());
        assert_eq!(second.seen_total, 2);
    }

    #[tokio::test]
    async fn test_cosmetic_variants_are_duplicates() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        let config = config(&seen_file, vec![source("A", BOARD_A)], 10);

        let crawler = FakeCrawler::default().page(BOARD_A, &["Railway RRB Result 2024 Declared Now"]);
        run(&config, &crawler, &FakeNotifier::default()).await.unwrap();

        let crawler = FakeCrawler::default().page(BOARD_A, &["railway rrb RESULT 2024 declared now!!"]);
        let summary = run(&config, &crawler, &FakeNotifier::default()).await.unwrap();
        assert!(summary.accepted.is_empty());
        assert_eq!(summary.duplicates, 1);
    }

    #[tokio::test]
    async fn test_quota_overflow_stays_unseen() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        let config = config(&seen_file, vec![source("A", BOARD_A)], 10);

        let titles: Vec<String> = (1..=12)
            .map(|i| format!("Clerk Recruitment Batch {i}"))
            .collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let crawler = FakeCrawler::default().page(BOARD_A, &refs);

        let first = run(&config, &crawler, &FakeNotifier::default()).await.unwrap();
        assert_eq!(first.accepted.len(), 10);
        assert_eq!(first.over_quota, 2);
        assert!(first.accepted.iter().all(|i| i.category == Category::LatestJob));
        assert_eq!(first.seen_total, 10);

        let store = SeenStore::load(&seen_file).await.unwrap();
        for title in &titles[10..] {
            let fp = fingerprint(&normalize(title), Category::LatestJob);
            assert!(!store.contains(&fp));
        }

        // The two left over come through on the next run.
        let second = run(&config, &crawler, &FakeNotifier::default()).await.unwrap();
        let leftover: Vec<&str> = second.accepted.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(leftover, vec!["Clerk Recruitment Batch 11", "Clerk Recruitment Batch 12"]);
    }

    #[tokio::test]
    async fn test_failed_notification_still_saves() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        let config = config(&seen_file, vec![source("A", BOARD_A)], 10);
        let crawler = FakeCrawler::default().page(BOARD_A, &["CTET Answer Key 2024 Released"]);

        let notifier = FakeNotifier {
            fail: true,
            ..Default::default()
        };
        let summary = run(&config, &crawler, &notifier).await.unwrap();
        assert!(matches!(summary.notify, NotifyStatus::Failed(_)));
        assert_eq!(summary.accepted.len(), 1);
        assert!(seen_file.exists());

        let store = SeenStore::load(&seen_file).await.unwrap();
        assert!(store.is_empty());

        // Delivered on the next run, then remembered.
        let notifier = FakeNotifier::default();
        let retry = run(&config, &crawler, &notifier).await.unwrap();
        assert_eq!(retry.accepted.len(), 1);
        assert_eq!(retry.notify, NotifyStatus::Sent);
        assert_eq!(retry.seen_total, 1);
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_earlier_history() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        let config = config(&seen_file, vec![source("A", BOARD_A)], 10);

        let crawler = FakeCrawler::default().page(BOARD_A, &["HSSC CET Result 2024 Out"]);
        run(&config, &crawler, &FakeNotifier::default()).await.unwrap();

        let crawler = FakeCrawler::default().page(
            BOARD_A,
            &["HSSC CET Result 2024 Out", "HSSC CET Admit Card 2025"],
        );
        let notifier = FakeNotifier {
            fail: true,
            ..Default::default()
        };
        let summary = run(&config, &crawler, &notifier).await.unwrap();
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.accepted.len(), 1);
        assert_eq!(summary.seen_total, 1);
    }

    #[tokio::test]
    async fn test_empty_run_still_saves() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        let config = config(&seen_file, vec![source("A", BOARD_A)], 10);

        let summary = run(&config, &FakeCrawler::default(), &FakeNotifier::default())
            .await
            .unwrap();
        assert!(summary.accepted.is_empty());
        assert!(seen_file.exists());
    }

    #[tokio::test]
    async fn test_broken_source_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        let config = config(
            &seen_file,
            vec![source("Down", BOARD_A), source("Up", BOARD_B)],
            10,
        );
        let crawler = FakeCrawler::default()
            .broken(BOARD_A)
            .page(BOARD_B, &["UPSC Civil Services Result 2024"]);

        let summary = run(&config, &crawler, &FakeNotifier::default()).await.unwrap();
        assert_eq!(summary.failed_pages, 1);
        assert_eq!(summary.accepted.len(), 1);
        assert_eq!(summary.accepted[0].source_id, "Up");
    }

    #[tokio::test]
    async fn test_unwritable_store_is_fatal() {
        let dir = TempDir::new().unwrap();
        let seen_file = dir.path().join("seen.txt");
        // A non-empty directory squatting on the temp file path blocks the save.
        std::fs::create_dir_all(dir.path().join("seen.txt.tmp/occupied")).unwrap();
        let config = config(&seen_file, vec![source("A", BOARD_A)], 10);
        let crawler = FakeCrawler::default().page(BOARD_A, &["SSC GD Constable Recruitment"]);

        let err = run(&config, &crawler, &FakeNotifier::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(!seen_file.exists());
    }

    #[test]
    fn test_decider_rules() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir.path().join("seen.txt"), vec![], 1);
        let store = SeenStore::empty(&config.seen_file);
        let mut decider = Decider::new(&store, &config, "18-10-2026".to_string());

        let candidate = |title: &str| Candidate {
            raw_title: title.to_string(),
            source_page_url: BOARD_A.to_string(),
            resolved_link: format!("{BOARD_A}x"),
        };

        assert_eq!(decider.decide("A", candidate("Short")), Decision::TooShort);
        assert_eq!(
            decider.decide("A", candidate("Admit Card for Result Review Exam")),
            Decision::Accepted(Category::Result)
        );
        assert_eq!(
            decider.decide("A", candidate("ADMIT CARD for result review exam!")),
            Decision::Duplicate(Category::Result)
        );
        assert_eq!(
            decider.decide("A", candidate("Bihar Police Result 2024")),
            Decision::OverQuota(Category::Result)
        );
        assert_eq!(
            decider.decide("B", candidate("Bihar Police Admit Card")),
            Decision::Accepted(Category::AdmitCard)
        );

        let (accepted, pending) = decider.finish();
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[1].source_id, "B");
        assert_eq!(accepted[1].date, "18-10-2026");
        assert_eq!(pending.len(), 2);
        assert!(store.is_empty());
    }
}
