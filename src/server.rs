use crate::config::Config;
use crate::error::Error;
use crate::i18n::{Language, LanguageCatalog};
use crate::run::{self, RunContext, RunError, RunOutcome, RunRequest, SpeechRequest};
use crate::speech::{GoogleSpeech, SpeechSynthesizer};
use crate::translation::{GoogleTranslator, Translator};
use crate::usage::{run_blocking, HistoryLog, UsageLedger, UsageSummary};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

const INDEX_HTML: &str = include_str!("../assets/index.html");

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 500;

/// Long-lived pieces shared by all requests. Per-run state lives in
/// [`RunContext`], built fresh for every request.
pub struct AppState {
    pub catalog: &'static LanguageCatalog,
    pub ledger: UsageLedger,
    pub history: HistoryLog,
    pub translator: Box<dyn Translator>,
    pub synthesizer: Box<dyn SpeechSynthesizer>,
}

impl AppState {
    /// Wire the Google clients and the on-disk stores named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            catalog: LanguageCatalog::builtin(),
            ledger: UsageLedger::new(&config.usage_ledger_path),
            history: HistoryLog::new(&config.history_log_path),
            translator: Box::new(GoogleTranslator::new(client.clone(), &config.translate_api_url)),
            synthesizer: Box::new(GoogleSpeech::new(client, &config.speech_api_url)),
        })
    }

    fn run_context(&self) -> RunContext<'_> {
        RunContext {
            catalog: self.catalog,
            ledger: &self.ledger,
            history: Some(&self.history),
            translator: self.translator.as_ref(),
            synthesizer: self.synthesizer.as_ref(),
            started_at: Utc::now(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/languages", get(languages))
        .route("/api/translate", post(translate))
        .route("/api/speech", post(speech))
        .route("/api/usage", get(usage))
        .route("/api/history", get(history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Errors ====================

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    /// Offending ledger row, for corrupt-ledger errors
    #[serde(skip_serializing_if = "Option::is_none")]
    row: Option<usize>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::UnknownLanguage(_) | Error::EmptyText | Error::EmptyInput => StatusCode::BAD_REQUEST,
            Error::Persistence { .. }
            | Error::CorruptLedger { .. }
            | Error::LedgerUnreadable { .. }
            | Error::HistoryUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let row = match err {
            Error::CorruptLedger { row, .. } => Some(row),
            _ => None,
        };
        Self {
            status,
            body: ErrorResponse {
                error: err.to_string(),
                row,
            },
        }
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Rejected(inner) => inner.into(),
            other => Self {
                status: StatusCode::BAD_GATEWAY,
                body: ErrorResponse {
                    error: other.to_string(),
                    row: None,
                },
            },
        }
    }
}

// ==================== Handlers ====================

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn languages(State(state): State<Arc<AppState>>) -> Json<Vec<Language>> {
    Json(state.catalog.languages())
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunOutcome>, ApiError> {
    let outcome = run::execute(&state.run_context(), &request).await?;
    Ok(Json(outcome))
}

async fn speech(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    let audio = run::speak(&state.run_context(), &request).await?;
    Ok((
        [(header::CONTENT_TYPE, state.synthesizer.content_type())],
        audio,
    )
        .into_response())
}

async fn usage(State(state): State<Arc<AppState>>) -> Result<Json<UsageSummary>, ApiError> {
    let ledger = state.ledger.clone();
    let counts = run_blocking(move || ledger.read_aggregated()).await.map_err(|e| {
        warn!("Usage summary unavailable: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(UsageSummary::from_counts(counts)))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    let history = state.history.clone();
    Ok(Json(run_blocking(move || history.recent(limit)).await?))
}
