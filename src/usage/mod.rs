//! Usage tracking: the CSV ledger, the statistics drawn from it, and the
//! free-form history log.

mod history;
mod ledger;
mod stats;

pub use history::{HistoryEntry, HistoryLog};
pub use ledger::{aggregate, AggregatedCount, UsageLedger, UsageRecord, LEDGER_HEADER};
pub use stats::{max, mean, Share, UsageSummary};

/// Run file I/O on the blocking pool so async workers stay free.
///
/// A panic inside `f` is resumed on the calling task.
pub async fn run_blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}
