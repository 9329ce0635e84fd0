//! Error taxonomy for the language catalog and the usage stores.
//!
//! Every variant degrades a single user action only; none of them is fatal to
//! the process. The HTTP layer decides how each one is surfaced.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested display name is not a key of the catalog.
    #[error("Unknown language: '{0}'")]
    UnknownLanguage(String),

    /// The text to translate was empty or whitespace only.
    #[error("Enter text to translate")]
    EmptyText,

    /// Appending to the ledger failed. The translation itself still stands.
    #[error("Failed to record usage in {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The ledger exists but a record could not be parsed.
    ///
    /// `row` counts records from the top of the file: the header is row 0 and
    /// the first usage event is row 1.
    #[error("Usage ledger is corrupt at row {row}: {reason}")]
    CorruptLedger { row: usize, reason: String },

    /// The ledger exists but could not be opened or read.
    #[error("Failed to read usage ledger {}: {source}", path.display())]
    LedgerUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The translation history log could not be written or read.
    #[error("Failed to access translation history {}: {source}", path.display())]
    HistoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Statistics were requested over zero aggregated rows.
    #[error("No usage history yet")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, Error>;
