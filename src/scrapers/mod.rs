//! Page fetching and anchor extraction.
//!
//! Every configured page is fetched, parsed, and reduced to a list of
//! [`Candidate`]s (visible anchor text plus an absolute link). A page that
//! fails for any reason yields an error that the orchestrator turns into
//! "no candidates from this page"; the run carries on.
//!
//! # Submodules
//!
//! - [`anchors`]: pure HTML to candidate extraction
//! - [`http`]: the [`reqwest`]-backed [`Crawler`] used in production
//!
//! Pages are fetched concurrently with `futures::stream`, bounded by the
//! configured concurrency, and results come back in configuration order so
//! the decision pass that follows is deterministic.

use crate::error::FetchError;
use crate::models::{Candidate, Source};
use futures::stream::{self, StreamExt};
use tracing::{info, instrument};

pub mod anchors;
pub mod http;

pub use self::http::HttpCrawler;

/// Something that can turn a page URL into candidates.
pub trait Crawler {
    /// Fetch one page and extract its candidates.
    async fn fetch_candidates(&self, page_url: &str) -> Result<Vec<Candidate>, FetchError>;
}

/// Result of fetching a single configured page.
#[derive(Debug)]
pub struct PageFetch<'a> {
    pub source: &'a Source,
    pub page_url: &'a str,
    pub result: Result<Vec<Candidate>, FetchError>,
}

/// Fetch every page of every source, at most `concurrency` at a time.
///
/// The returned list follows the order of `sources` and of each source's
/// `urls`, whatever order the fetches complete in.
#[instrument(level = "info", skip_all, fields(sources = sources.len(), concurrency = concurrency))]
pub async fn crawl_sources<'a, C: Crawler>(
    crawler: &C,
    sources: &'a [Source],
    concurrency: usize,
) -> Vec<PageFetch<'a>> {
    let pages: Vec<(&'a Source, &'a str)> = sources
        .iter()
        .flat_map(|source| source.urls.iter().map(move |url| (source, url.as_str())))
        .collect();
    let total = pages.len();

    let fetched: Vec<PageFetch<'a>> = stream::iter(pages)
        .map(|(source, page_url)| async move {
            let result = crawler.fetch_candidates(page_url).await;
            PageFetch {
                source,
                page_url,
                result,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let failed = fetched.iter().filter(|p| p.result.is_err()).count();
    info!(pages = total, failed, "Crawled all sources");
    fetched
}
