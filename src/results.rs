//! Append-only match-result log with crash-tolerant replay.
//!
//! One compact JSON object per line. The format is what makes reruns
//! safe: a crash mid-run loses at most the lines that were never
//! written, and replay recomputes the completed-pair set from whatever
//! prefix survived. A torn final line (crash mid-write) fails to parse
//! and is skipped, not treated as corruption.
//!
//! The completed-pair set is never persisted on its own: it is always a
//! pure function of this log.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::pairing::Pair;
use crate::types::MatchRecord;

#[derive(Debug, Error)]
pub enum ResultLogError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResultLogError>;

/// Replays the log and returns the set of pairs that already have a
/// result. A missing file is an empty set; a line that fails to parse
/// is silently skipped.
pub fn load_completed(path: &Path) -> Result<HashSet<Pair>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(source) => {
            return Err(ResultLogError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut completed = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| ResultLogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match serde_json::from_str::<MatchRecord>(&line) {
            Ok(record) => {
                completed.insert(record.pair());
            }
            // Torn final line from a crashed run, or stray noise; either
            // way the pair never completed, so replay it.
            Err(_) => debug!(line_len = line.len(), "skipping unparsable result line"),
        }
    }
    Ok(completed)
}

/// Handle for appending results. Appends from concurrent completions are
/// serialized through an internal mutex so lines never interleave.
pub struct ResultLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl ResultLog {
    /// Opens the log for appending, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ResultLogError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(ResultLog {
            file: Mutex::new(file),
            path,
        })
    }

    /// Appends one record as a compact JSON line.
    pub async fn append(&self, record: &MatchRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let mut file = self.file.lock().await;
        writeln!(file, "{json}").map_err(|source| ResultLogError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for ResultLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
