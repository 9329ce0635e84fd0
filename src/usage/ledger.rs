//! Usage ledger: the append-only CSV record of translation events.
//!
//! The file has a single `language` column. Every successful, recorded
//! translation appends one row holding the display name of the target
//! language. Aggregation always re-reads the whole file because other
//! processes may have appended to it since the last read.
//!
//! No lock is taken. Each append is issued as one `write_all` on a file
//! opened in append mode, which keeps short rows intact on local filesystems,
//! but two processes racing on a brand-new file can both write the header.

use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column name written as the first row of a new ledger.
pub const LEDGER_HEADER: &str = "language";

/// One recorded translation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub language: String,
}

/// Number of recorded events for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedCount {
    pub language: String,
    pub count: u64,
}

impl AggregatedCount {
    pub fn new(language: impl Into<String>, count: u64) -> Self {
        Self {
            language: language.into(),
            count,
        }
    }
}

/// Handle on the ledger file. Holds only the path; nothing is cached.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    path: PathBuf,
}

impl UsageLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one usage event for `language`.
    ///
    /// Creates the file (and its parent directory) with a header row when it
    /// does not exist yet.
    ///
    /// # Errors
    /// `Error::Persistence` if the name is blank or the file cannot be
    /// written. The caller still serves the translation.
    pub fn append(&self, language: &str) -> Result<()> {
        if language.trim().is_empty() {
            return Err(self.persistence(io::Error::new(
                io::ErrorKind::InvalidInput,
                "language name is blank",
            )));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.persistence(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.persistence(e))?;

        let len = file.metadata().map_err(|e| self.persistence(e))?.len();
        let needs_header = len == 0;
        let mut row = Vec::new();
        if !needs_header && !ends_with_newline(&mut file, len).map_err(|e| self.persistence(e))? {
            // Terminate a trailing record so the new row does not merge into it
            row.push(b'\n');
        }
        row.extend(encode_row(language, needs_header).map_err(|e| self.persistence(e))?);

        file.write_all(&row).map_err(|e| self.persistence(e))?;

        debug!("Recorded usage of {} in {}", language, self.path.display());
        Ok(())
    }

    /// Read every record in file order.
    ///
    /// A missing file is "no history yet" and yields an empty list.
    ///
    /// # Errors
    /// `Error::CorruptLedger` on the first record that does not parse,
    /// `Error::LedgerUnreadable` if the file exists but cannot be read.
    pub fn read_records(&self) -> Result<Vec<UsageRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No usage ledger at {} yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::LedgerUnreadable {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        parse_records(&self.path, file)
    }

    /// Re-read the ledger and count events per language.
    ///
    /// Sorted by count descending, ties broken by language name ascending.
    /// Fails fast on the first malformed record rather than returning a
    /// partial aggregate.
    pub fn read_aggregated(&self) -> Result<Vec<AggregatedCount>> {
        let records = self.read_records()?;
        Ok(aggregate(&records))
    }

    fn persistence(&self, source: io::Error) -> Error {
        Error::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n' || last[0] == b'\r')
}

/// Group records by language and count them.
pub fn aggregate(records: &[UsageRecord]) -> Vec<AggregatedCount> {
    let mut tally: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *tally.entry(record.language.as_str()).or_insert(0) += 1;
    }

    // BTreeMap yields names ascending; the stable sort keeps that order for ties
    let mut counts: Vec<AggregatedCount> = tally
        .into_iter()
        .map(|(language, count)| AggregatedCount::new(language, count))
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn encode_row(language: &str, with_header: bool) -> io::Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if with_header {
        writer.write_record([LEDGER_HEADER])?;
    }
    writer.write_record([language])?;
    writer.into_inner().map_err(|e| e.into_error())
}

fn parse_records<R: Read>(path: &Path, source: R) -> Result<Vec<UsageRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| classify_read_error(path, row, e))?;

        if row == 0 {
            if record.len() != 1 || record.get(0).map(str::trim) != Some(LEDGER_HEADER) {
                return Err(Error::CorruptLedger {
                    row,
                    reason: format!("expected a '{}' header", LEDGER_HEADER),
                });
            }
            continue;
        }

        records.push(UsageRecord {
            language: single_field(row, &record)?,
        });
    }

    Ok(records)
}

fn single_field(row: usize, record: &StringRecord) -> Result<String> {
    if record.len() != 1 {
        return Err(Error::CorruptLedger {
            row,
            reason: format!("expected 1 field, found {}", record.len()),
        });
    }

    let language = record.get(0).unwrap_or_default();
    if language.trim().is_empty() {
        return Err(Error::CorruptLedger {
            row,
            reason: "language name is blank".to_string(),
        });
    }

    Ok(language.to_string())
}

fn classify_read_error(path: &Path, row: usize, err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::LedgerUnreadable {
            path: path.to_path_buf(),
            source,
        },
        csv::ErrorKind::Utf8 { err, .. } => Error::CorruptLedger {
            row,
            reason: format!("invalid UTF-8 ({})", err),
        },
        other => Error::CorruptLedger {
            row,
            reason: format!("unparseable record ({:?})", other),
        },
    }
}
