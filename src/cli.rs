//! Command-line interface definitions for Notice Watch.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Everything except `--config`, `--dry-run` and `--json-report` can also be
//! supplied through environment variables, which is how scheduled runs
//! (cron, CI) usually pass mail credentials.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for Notice Watch.
///
/// # Examples
///
/// ```sh
/// # Mail new items found on the built-in sources
/// EMAIL_FROM=bot@example.com EMAIL_TO=me@example.com EMAIL_PASSWORD=... notice_watch
///
/// # Custom source list, print instead of mailing
/// notice_watch -c sources.yaml --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML file listing the sources to poll (built-in list when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File holding fingerprints of already reported items
    #[arg(short, long, env = "SEEN_FILE", default_value = "seen_signal.txt")]
    pub seen_file: PathBuf,

    /// Maximum new items reported per category in one run
    #[arg(long, env = "MAX_PER_CATEGORY", default_value_t = 10)]
    pub max_per_category: u32,

    /// Anchor texts shorter than this many characters are ignored
    #[arg(long, env = "MIN_TITLE_LEN", default_value_t = 12)]
    pub min_title_len: usize,

    /// Per-page fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 20)]
    pub fetch_timeout_secs: u64,

    /// Number of pages fetched in parallel
    #[arg(long, env = "FETCH_CONCURRENCY", default_value_t = 4)]
    pub concurrency: usize,

    /// User-Agent header sent with every request
    #[arg(long, env = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Sender address
    #[arg(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Recipient address(es), comma separated
    #[arg(long, env = "EMAIL_TO")]
    pub email_to: Option<String>,

    /// SMTP password (app password for Gmail)
    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true)]
    pub email_password: Option<String>,

    /// SMTP login; defaults to the sender address
    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP relay host (STARTTLS)
    #[arg(long, env = "SMTP_SERVER", default_value = "smtp.gmail.com")]
    pub smtp_server: String,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// Name used in the report greeting
    #[arg(long, env = "GREETING_NAME")]
    pub greeting_name: Option<String>,

    /// Print the report instead of mailing it
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the accepted items as JSON to this path
    #[arg(long)]
    pub json_report: Option<PathBuf>,
}
