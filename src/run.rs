//! One user action, start to finish.
//!
//! Everything a run needs is passed in through [`RunContext`]; nothing is
//! kept in process-wide state between runs. The flow is: resolve the
//! language, translate, record the event if asked to, then recompute the
//! usage summary from the ledger.

use crate::error::Error;
use crate::i18n::{Language, LanguageCatalog};
use crate::speech::SpeechSynthesizer;
use crate::translation::Translator;
use crate::usage::{run_blocking, HistoryEntry, HistoryLog, UsageLedger, UsageSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Collaborators and stores for a single run.
pub struct RunContext<'a> {
    pub catalog: &'a LanguageCatalog,
    pub ledger: &'a UsageLedger,
    pub history: Option<&'a HistoryLog>,
    pub translator: &'a dyn Translator,
    pub synthesizer: &'a dyn SpeechSynthesizer,
    /// Timestamp written to the history log for this run
    pub started_at: DateTime<Utc>,
}

fn default_record() -> bool {
    true
}

/// What the user submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub text: String,
    /// Display name picked from the language list
    pub language: String,
    /// "Persist this event"
    #[serde(default = "default_record")]
    pub record: bool,
    /// "Show resolved code"
    #[serde(default)]
    pub show_code: bool,
}

/// What the results panel shows.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub language: String,
    pub translated: String,
    pub detected_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Whether the event made it into the usage ledger
    pub recorded: bool,
    pub warnings: Vec<String>,
    pub usage: Option<UsageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub language: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Bad input: blank text or a language outside the catalog
    #[error(transparent)]
    Rejected(#[from] Error),

    /// The translation service failed; details are logged, not shown
    #[error("Translation failed, please try again")]
    Translation(anyhow::Error),

    /// The speech service failed; details are logged, not shown
    #[error("Speech synthesis failed, please try again")]
    Speech(anyhow::Error),
}

/// Translate one request and update usage tracking.
///
/// Recording is best effort: a ledger or history failure becomes a warning
/// on an otherwise successful outcome, and a corrupt ledger only removes the
/// usage summary.
pub async fn execute(ctx: &RunContext<'_>, request: &RunRequest) -> Result<RunOutcome, RunError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(Error::EmptyText.into());
    }

    let language = ctx.catalog.resolve(request.language.trim())?;

    let translation = ctx
        .translator
        .translate(text, language.code())
        .await
        .map_err(|e| {
            warn!("{} translation to {} failed: {:#}", ctx.translator.name(), language, e);
            RunError::Translation(e)
        })?;

    let mut warnings = Vec::new();
    let recorded =
        request.record && record_event(ctx, language, text, &translation.text, &mut warnings).await;

    let ledger = ctx.ledger.clone();
    let (usage, usage_error) = match run_blocking(move || ledger.read_aggregated()).await {
        Ok(counts) => (Some(UsageSummary::from_counts(counts)), None),
        Err(e) => {
            warn!("Usage summary unavailable: {}", e);
            (None, Some(e.to_string()))
        }
    };

    info!(
        "Translated {} chars to {} (recorded: {})",
        text.chars().count(),
        language,
        recorded
    );

    Ok(RunOutcome {
        language: language.name().to_string(),
        translated: translation.text,
        detected_source: translation.detected_source,
        code: request.show_code.then(|| language.code().to_string()),
        recorded,
        warnings,
        usage,
        usage_error,
    })
}

/// Append the event to the ledger and the history log.
///
/// Returns whether the ledger row was written; the history log is secondary
/// and only ever adds a warning.
async fn record_event(
    ctx: &RunContext<'_>,
    language: Language,
    original: &str,
    translated: &str,
    warnings: &mut Vec<String>,
) -> bool {
    let ledger = ctx.ledger.clone();
    let recorded = match run_blocking(move || ledger.append(language.name())).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Usage not recorded: {}", e);
            warnings.push(e.to_string());
            false
        }
    };

    if let Some(history) = ctx.history {
        let history = history.clone();
        let timestamp = ctx.started_at;
        let (original, translated) = (original.to_string(), translated.to_string());
        let written = run_blocking(move || {
            history.append(&HistoryEntry {
                timestamp,
                language,
                original: &original,
                translated: &translated,
            })
        })
        .await;
        if let Err(e) = written {
            warn!("History not written: {}", e);
            warnings.push(e.to_string());
        }
    }

    recorded
}

/// Synthesize speech for already-translated text.
pub async fn speak(ctx: &RunContext<'_>, request: &SpeechRequest) -> Result<Vec<u8>, RunError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(Error::EmptyText.into());
    }

    let language = ctx.catalog.resolve(request.language.trim())?;

    ctx.synthesizer
        .synthesize(text, language.code())
        .await
        .map_err(|e| {
            warn!("Speech synthesis in {} failed: {:#}", language, e);
            RunError::Speech(e)
        })
}
