//! # Notice Watch
//!
//! A batch job that polls announcement pages (results, admit cards, answer
//! keys, job notices), works out which links are new since the last run, and
//! mails the new ones as a single report.
//!
//! ## Usage
//!
//! ```sh
//! EMAIL_FROM=bot@example.com EMAIL_TO=me@example.com EMAIL_PASSWORD=... notice_watch
//! notice_watch -c sources.yaml --dry-run
//! ```
//!
//! ## Architecture
//!
//! One invocation is one run:
//! 1. **Configuration**: flags/env validated into an immutable [`config::AppConfig`]
//! 2. **Loading**: the seen-fingerprint file is read (missing file = first run)
//! 3. **Crawling**: every source page is fetched and its anchors extracted
//! 4. **Deciding**: each anchor is categorized, fingerprinted, deduplicated
//!    and checked against the per-category quota
//! 5. **Reporting**: new items are mailed (or printed with `--dry-run`)
//! 6. **Persisting**: the seen file is replaced with the updated set
//!
//! Meant to be triggered by a scheduler; runs must not overlap on the same
//! seen file.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod categorizer;
mod cli;
mod config;
mod error;
mod fingerprint;
mod models;
mod orchestrator;
mod outputs;
mod quota;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use config::{AppConfig, Delivery};
use orchestrator::{NotifyStatus, RunSummary};
use outputs::{SmtpNotifier, StdoutNotifier, json};
use scrapers::HttpCrawler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("notice_watch starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.seen_file, dry_run = args.dry_run, "Parsed CLI arguments");

    // Fail fast: nothing is fetched or written with a broken configuration.
    let config = match AppConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        sources = config.sources.len(),
        max_per_category = config.max_per_category,
        seen_file = %config.seen_file.display(),
        "Configuration loaded"
    );

    let crawler = HttpCrawler::new(&config.fetch.user_agent, config.fetch.timeout)?;

    let summary = match &config.delivery {
        Delivery::Smtp(mail) => {
            let notifier = SmtpNotifier::new(mail, config.greeting_name.clone())?;
            orchestrator::run(&config, &crawler, &notifier).await?
        }
        Delivery::DryRun => {
            let notifier = StdoutNotifier {
                greeting_name: config.greeting_name.clone(),
            };
            orchestrator::run(&config, &crawler, &notifier).await?
        }
    };

    if let Some(path) = &config.json_report {
        if let Err(e) = json::write_report(&summary.accepted, &utils::run_date(), path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON report");
        }
    }

    log_summary(&summary);
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    println!("Done | New items: {}", summary.accepted.len());
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    match &summary.notify {
        NotifyStatus::Sent => info!(count = summary.accepted.len(), "Report delivered"),
        NotifyStatus::Skipped => info!("Nothing new; no report sent"),
        NotifyStatus::Failed(reason) => {
            error!(%reason, count = summary.accepted.len(), "Report not delivered")
        }
    }
    info!(
        pages = summary.pages,
        failed_pages = summary.failed_pages,
        candidates = summary.candidates,
        too_short = summary.too_short,
        duplicates = summary.duplicates,
        over_quota = summary.over_quota,
        seen_total = summary.seen_total,
        "Run summary"
    );
}
