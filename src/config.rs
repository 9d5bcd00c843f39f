//! Validated run configuration.
//!
//! [`AppConfig::from_cli`] turns parsed flags (and the optional YAML source
//! list) into one immutable value, checked up front so that a bad setup
//! fails before anything is fetched or written. The orchestrator only ever
//! sees it by reference.
//!
//! # Source list format
//!
//! ```yaml
//! sources:
//!   - id: ResultBharat
//!     urls:
//!       - https://www.resultbharat.com/
//!   - id: FreeJobAlert
//!     urls:
//!       - https://www.freejobalert.com/
//!       - https://www.freejobalert.com/admit-card/
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::models::Source;
use crate::scrapers::http::DEFAULT_USER_AGENT;
use lettre::message::Mailbox;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Sources polled when no source list is given.
const DEFAULT_SOURCES: [(&str, &str); 3] = [
    ("ResultBharat", "https://www.resultbharat.com/"),
    ("RojgarResult", "https://rojgarresult.com/"),
    ("FreeJobAlert", "https://www.freejobalert.com/"),
];

#[derive(Debug, Deserialize)]
struct SourceFile {
    sources: Vec<Source>,
}

/// How pages are fetched.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub concurrency: usize,
}

/// SMTP settings, only present when mail delivery is enabled.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
    pub username: String,
    pub password: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

/// Where the report goes.
#[derive(Debug, Clone)]
pub enum Delivery {
    Smtp(MailConfig),
    DryRun,
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sources: Vec<Source>,
    pub seen_file: PathBuf,
    pub max_per_category: u32,
    pub min_title_len: usize,
    pub fetch: FetchConfig,
    pub delivery: Delivery,
    pub greeting_name: Option<String>,
    pub json_report: Option<PathBuf>,
}

impl AppConfig {
    /// Validate `cli` into a run configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for a missing credential (unless `--dry-run`), an
    /// unparsable address, an unreadable or invalid source list, or an
    /// out-of-range number.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let sources = match &cli.config {
            Some(path) => load_sources(path)?,
            None => default_sources(),
        };
        validate_sources(&sources)?;

        if cli.max_per_category == 0 {
            return Err(ConfigError::Invalid {
                field: "max_per_category",
                reason: "must be at least 1".to_string(),
            });
        }
        if cli.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        let delivery = if cli.dry_run {
            Delivery::DryRun
        } else {
            Delivery::Smtp(mail_config(cli)?)
        };

        Ok(Self {
            sources,
            seen_file: cli.seen_file.clone(),
            max_per_category: cli.max_per_category,
            min_title_len: cli.min_title_len,
            fetch: FetchConfig {
                user_agent: cli
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                timeout: Duration::from_secs(cli.fetch_timeout_secs),
                concurrency: cli.concurrency.max(1),
            },
            delivery,
            greeting_name: cli.greeting_name.clone(),
            json_report: cli.json_report.clone(),
        })
    }
}

pub fn default_sources() -> Vec<Source> {
    DEFAULT_SOURCES
        .iter()
        .map(|(id, url)| Source {
            id: id.to_string(),
            urls: vec![url.to_string()],
        })
        .collect()
}

fn load_sources(path: &Path) -> Result<Vec<Source>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: SourceFile = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.sources)
}

fn validate_sources(sources: &[Source]) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        field: "sources",
        reason,
    };

    if sources.is_empty() {
        return Err(invalid("no sources configured".to_string()));
    }

    let mut ids = HashSet::new();
    for source in sources {
        if source.id.trim().is_empty() {
            return Err(invalid("source with empty id".to_string()));
        }
        if !ids.insert(source.id.as_str()) {
            return Err(invalid(format!("duplicate source id `{}`", source.id)));
        }
        if source.urls.is_empty() {
            return Err(invalid(format!("source `{}` has no urls", source.id)));
        }
        for url in &source.urls {
            match Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(_) => {
                    return Err(invalid(format!("`{url}` is not an http(s) url")));
                }
                Err(e) => return Err(invalid(format!("`{url}`: {e}"))),
            }
        }
    }
    Ok(())
}

fn mail_config(cli: &Cli) -> Result<MailConfig, ConfigError> {
    let from_raw = required(&cli.email_from, "email_from")?;
    let to_raw = required(&cli.email_to, "email_to")?;
    let password = required(&cli.email_password, "email_password")?;

    let from = parse_mailbox(from_raw, "email_from")?;
    let to = to_raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_mailbox(s, "email_to"))
        .collect::<Result<Vec<_>, _>>()?;
    if to.is_empty() {
        return Err(ConfigError::Missing("email_to"));
    }

    let username = cli
        .smtp_username
        .clone()
        .unwrap_or_else(|| from.email.to_string());

    Ok(MailConfig {
        from,
        to,
        username,
        password: password.to_string(),
        smtp_server: cli.smtp_server.clone(),
        smtp_port: cli.smtp_port,
    })
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(field))
}

fn parse_mailbox(raw: &str, field: &'static str) -> Result<Mailbox, ConfigError> {
    raw.parse::<Mailbox>().map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("`{raw}`: {e}"),
    })
}
