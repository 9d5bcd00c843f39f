//! HTTP crawler backed by a shared [`reqwest::Client`].

use super::Crawler;
use super::anchors::extract_anchors;
use crate::error::FetchError;
use crate::models::Candidate;
use crate::utils::truncate_for_log;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Browser-like identity; several announcement sites reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Fetches pages over HTTP(S) with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpCrawler {
    client: Client,
}

impl HttpCrawler {
    /// Build a crawler sending `user_agent` and giving up on a page after
    /// `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-IN,en;q=0.9"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Crawler for HttpCrawler {
    #[instrument(level = "info", skip_all, fields(%page_url))]
    async fn fetch_candidates(&self, page_url: &str) -> Result<Vec<Candidate>, FetchError> {
        let url = Url::parse(page_url).map_err(|source| FetchError::Url {
            url: page_url.to_string(),
            source,
        })?;
        let http_err = |source| FetchError::Http {
            url: page_url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Page answered with non-success status");
            return Err(FetchError::Status {
                url: page_url.to_string(),
                status: status.as_u16(),
            });
        }

        // Resolve against where we actually landed after redirects.
        let final_url = response.url().clone();
        let html = response.text().await.map_err(http_err)?;
        debug!(
            bytes = html.len(),
            preview = %truncate_for_log(&html, 200),
            "Fetched page"
        );

        let candidates = extract_anchors(&html, &final_url, page_url);
        info!(count = candidates.len(), "Extracted candidates");
        Ok(candidates)
    }
}
