//! Error types for a single watch run.
//!
//! Each variant family maps to one failure class with its own recovery rule:
//!
//! | Error | Where | Effect on the run |
//! |-------|-------|-------------------|
//! | [`ConfigError`] | startup | fatal, nothing is fetched or written |
//! | [`FetchError`] | per page | page contributes zero candidates |
//! | [`NotifyError`] | delivery | logged, seen set is still saved |
//! | [`StoreError`] | seen file | fatal on save, load only fails on unreadable files |

use std::path::PathBuf;
use thiserror::Error;

/// Missing or malformed settings detected before any I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting was not supplied by flag or environment.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    /// A setting was present but could not be used.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The YAML source list could not be read.
    #[error("failed to read source list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML source list did not parse.
    #[error("failed to parse source list {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A page that could not be turned into candidates.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid page url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Report delivery failure.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Seen-file read or write failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read seen file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write seen file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
