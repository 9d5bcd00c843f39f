//! Report rendering and delivery.
//!
//! # Submodules
//!
//! - [`report`]: renders an accepted batch into a subject and plain-text body
//! - [`email`]: delivers the report over authenticated SMTP
//! - [`json`]: optional machine-readable copy of the batch
//!
//! Delivery goes through the [`Notifier`] trait so the orchestrator does not
//! care whether a report is mailed or printed (`--dry-run`).

use crate::error::NotifyError;
use crate::models::AcceptedItem;
use tokio::io::AsyncWriteExt;

pub mod email;
pub mod json;
pub mod report;

pub use email::SmtpNotifier;

/// Delivers one batch of accepted items.
pub trait Notifier {
    /// Deliver `items`. Called at most once per run, never with an empty batch.
    async fn notify(&self, items: &[AcceptedItem]) -> Result<(), NotifyError>;
}

/// Prints the report instead of sending it.
#[derive(Debug, Default)]
pub struct StdoutNotifier {
    pub greeting_name: Option<String>,
}

impl Notifier for StdoutNotifier {
    async fn notify(&self, items: &[AcceptedItem]) -> Result<(), NotifyError> {
        let report = report::render(items, self.greeting_name.as_deref());
        let text = format!("Subject: {}\n\n{}", report.subject, report.body);
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}
