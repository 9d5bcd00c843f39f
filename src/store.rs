//! Persisted set of fingerprints already reported.
//!
//! The on-disk format is one fingerprint per line, UTF-8, no ordering
//! requirement. Duplicate lines are harmless on load and undecodable lines are
//! skipped. The file is loaded once at start-up and replaced in full at the
//! end of each run; nothing is ever removed from it.
//!
//! The load/mutate/save cycle is not safe against concurrent runs sharing the
//! same file. Schedule runs so they cannot overlap.

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// In-memory seen set bound to its backing file.
#[derive(Debug)]
pub struct SeenStore {
    path: PathBuf,
    seen: HashSet<Fingerprint>,
}

impl SeenStore {
    /// Empty store that will save to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seen: HashSet::new(),
        }
    }

    /// Read the seen file.
    ///
    /// A missing file is a cold start and yields an empty set. Lines that are
    /// not valid UTF-8 or not fingerprints are skipped.
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] when the file exists but the read itself fails
    /// (permission denied, a directory in its place, ...).
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No seen file yet; starting with an empty set");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let mut seen = HashSet::new();
        let mut skipped = 0usize;
        for raw in bytes.split(|b| *b == b'\n') {
            let Ok(line) = std::str::from_utf8(raw) else {
                skipped += 1;
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            match Fingerprint::parse(line) {
                Some(fp) => {
                    seen.insert(fp);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "Ignored malformed lines in seen file");
        }
        info!(count = seen.len(), "Loaded seen fingerprints");

        Ok(Self { path, seen })
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.seen.contains(fp)
    }

    /// Insert a fingerprint. Returns `false` if it was already present.
    pub fn add(&mut self, fp: Fingerprint) -> bool {
        self.seen.insert(fp)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Replace the seen file with the current set.
    ///
    /// Writes a sorted listing to a sibling temp file, syncs it, then renames
    /// it over the target so a crash never leaves a half-written file.
    ///
    /// # Errors
    ///
    /// [`StoreError::Write`] if any step fails. The previous file, if any, is
    /// left in place in that case.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), count = self.seen.len()))]
    pub async fn save(&self) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut lines: Vec<&str> = self.seen.iter().map(Fingerprint::as_str).collect();
        lines.sort_unstable();
        let mut body = String::with_capacity(lines.len() * (Fingerprint::LEN + 1));
        for line in lines {
            body.push_str(line);
            body.push('\n');
        }

        let tmp_path = tmp_path_for(&self.path);
        let mut file = fs::File::create(&tmp_path).await.map_err(write_err)?;
        file.write_all(body.as_bytes()).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(write_err(e));
        }
        debug!(tmp = %tmp_path.display(), "Renamed temp file over seen file");
        info!("Saved seen fingerprints");
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "seen".into());
    name.push(".tmp");
    path.with_file_name(name)
}
