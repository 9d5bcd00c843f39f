//! JSON copy of an accepted batch.
//!
//! Written next to (not instead of) the mailed report when `--json-report`
//! is given, for dashboards or other tooling.
//!
//! ```text
//! {
//!   "date": "18-10-2026",
//!   "count": 1,
//!   "items": [ { "title": ..., "category": "Result", ... } ]
//! }
//! ```

use crate::models::AcceptedItem;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    date: &'a str,
    count: usize,
    items: &'a [AcceptedItem],
}

/// Write `items` as pretty JSON to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = items.len()))]
pub async fn write_report(
    items: &[AcceptedItem],
    date: &str,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&RunReport {
        date,
        count: items.len(),
        items,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON report dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON report");
    Ok(())
}
