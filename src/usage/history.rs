//! Free-form history log: one human-readable line per recorded translation.
//!
//! Line format: `{timestamp} | {name} ({code}) | {original} -> {translated}`.
//! The separators are not escaped, so text containing ` | ` or ` -> ` cannot
//! be split back into fields reliably. The log is meant to be read, not parsed.

use crate::error::{Error, Result};
use crate::i18n::Language;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One event to write to the history log.
#[derive(Debug, Clone)]
pub struct HistoryEntry<'a> {
    pub timestamp: DateTime<Utc>,
    pub language: Language,
    pub original: &'a str,
    pub translated: &'a str,
}

impl HistoryEntry<'_> {
    /// Format the entry as a single log line (without the trailing newline).
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {} -> {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.language,
            single_line(self.original),
            single_line(self.translated)
        )
    }
}

/// Keep one event on one line.
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line for `entry`.
    pub fn append(&self, entry: &HistoryEntry<'_>) -> Result<()> {
        let mut line = entry.to_line();
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|e| self.unavailable(e))
    }

    /// The last `limit` lines, newest first. A missing log is empty.
    pub fn recent(&self, limit: usize) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(self.unavailable(e))
            }
        };

        Ok(content
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .take(limit)
            .map(str::to_string)
            .collect())
    }

    fn unavailable(&self, source: io::Error) -> Error {
        Error::HistoryUnavailable {
            path: self.path.clone(),
            source,
        }
    }
}
