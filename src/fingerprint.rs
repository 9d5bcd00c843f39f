//! Title normalization and fingerprint keys.
//!
//! Two announcements are "the same" when their normalized titles and their
//! categories match. The key is `"{normalized}_{category label}"` hashed with
//! MD5 and hex encoded, the same format as seen files written by earlier runs.
//!
//! Normalization is lossy on purpose: case, punctuation, filler words and
//! anything past the sixth remaining token are ignored. Titles that reduce to
//! nothing still produce a (weak) key and may collide within a category.

use crate::models::Category;
use itertools::Itertools;
use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Filler words dropped from titles before hashing.
pub const STOP_WORDS: [&str; 9] = [
    "apply",
    "online",
    "download",
    "notification",
    "latest",
    "exam",
    "post",
    "declared",
    "out",
];

/// Tokens kept after stop-word removal.
pub const MAX_TOKENS: usize = 6;

static NON_TOKEN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9 ]").expect("static regex"));

/// Reduce a raw title to its comparable form.
///
/// Characters outside `[a-z0-9 ]` (after lower-casing) become spaces, so
/// `"2024-25"` gives two tokens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize("SSC CGL Result 2024 Declared"), "ssc cgl result 2024");
/// ```
pub fn normalize(raw_title: &str) -> String {
    let lowered = raw_title.to_lowercase();
    let cleaned = NON_TOKEN_CHARS.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .take(MAX_TOKENS)
        .join(" ")
}

/// Stable 128-bit identifier of an announcement, as 32 lower-case hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hex length of a fingerprint.
    pub const LEN: usize = 32;

    /// Build the key from its two inputs.
    pub fn new(normalized_title: &str, category: Category) -> Self {
        let key = format!("{}_{}", normalized_title, category.label());
        Fingerprint(hex::encode(Md5::digest(key.as_bytes())))
    }

    /// Accept a stored line if it looks like a fingerprint.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let well_formed = s.len() == Self::LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Fingerprint(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint of a normalized title under a category.
pub fn fingerprint(normalized_title: &str, category: Category) -> Fingerprint {
    Fingerprint::new(normalized_title, category)
}
