//! Anchor extraction from raw page markup.
//!
//! Every `a[href]` element becomes a [`Candidate`] when it has visible text
//! and its target resolves to an absolute `http(s)` link. A `<base href>` in
//! the document, when present, takes precedence over the page URL for
//! resolution, as browsers do.

use crate::models::Candidate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector"));
static BASE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("base[href]").expect("static selector"));

/// Extract candidates from `html` fetched from `page_url`.
///
/// `base` is the URL relative links are resolved against (normally the final
/// URL after redirects). Anchor text is every text node under the anchor,
/// whitespace-collapsed and joined with single spaces.
pub fn extract_anchors(html: &str, base: &Url, page_url: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);

    let base = document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| base.join(href.trim()).ok())
        .unwrap_or_else(|| base.clone());

    let mut candidates = Vec::new();
    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        let title = element.text().flat_map(str::split_whitespace).join(" ");
        if title.is_empty() {
            continue;
        }

        let link = match base.join(href) {
            Ok(link) => link,
            Err(e) => {
                debug!(%href, error = %e, "Skipping unresolvable href");
                continue;
            }
        };
        // Drops javascript:, mailto:, tel: and friends.
        if !matches!(link.scheme(), "http" | "https") {
            continue;
        }

        candidates.push(Candidate {
            raw_title: title,
            source_page_url: page_url.to_string(),
            resolved_link: link.to_string(),
        });
    }

    debug!(count = candidates.len(), %page_url, "Extracted anchors");
    candidates
}
