//! Summary statistics and chart series over aggregated usage counts.

use crate::error::{Error, Result};
use crate::usage::AggregatedCount;
use serde::Serialize;

/// Arithmetic mean of the count values.
///
/// # Errors
/// `Error::EmptyInput` when there are no counts.
pub fn mean(counts: &[AggregatedCount]) -> Result<f64> {
    if counts.is_empty() {
        return Err(Error::EmptyInput);
    }
    let total: u64 = counts.iter().map(|c| c.count).sum();
    Ok(total as f64 / counts.len() as f64)
}

/// Greatest count value.
///
/// # Errors
/// `Error::EmptyInput` when there are no counts.
pub fn max(counts: &[AggregatedCount]) -> Result<u64> {
    counts.iter().map(|c| c.count).max().ok_or(Error::EmptyInput)
}

/// One slice of the pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub language: String,
    /// Percentage of all recorded events (0-100)
    pub percent: f64,
}

/// Everything the page needs to draw the usage bar and pie charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    /// Bar chart series, already in display order
    pub counts: Vec<AggregatedCount>,

    /// Total number of recorded events
    pub total: u64,

    /// Mean count per language, `None` while there is no history
    pub mean: Option<f64>,

    /// Highest count, `None` while there is no history
    pub max: Option<u64>,

    /// Pie chart series in the same order as `counts`
    pub shares: Vec<Share>,
}

impl UsageSummary {
    pub fn from_counts(counts: Vec<AggregatedCount>) -> Self {
        let total: u64 = counts.iter().map(|c| c.count).sum();

        // Statistics only make sense once there is history
        let (mean_count, max_count) = if counts.is_empty() {
            (None, None)
        } else {
            (mean(&counts).ok(), max(&counts).ok())
        };

        let shares = counts
            .iter()
            .map(|c| Share {
                language: c.language.clone(),
                percent: c.count as f64 / total as f64 * 100.0,
            })
            .collect();

        Self {
            counts,
            total,
            mean: mean_count,
            max: max_count,
            shares,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
