use crate::retry::{is_retryable, with_retry_if, RetryConfig, UpstreamStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Result of one translation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub text: String,
    /// Source language code detected by the service, if it reported one
    pub detected_source: Option<String>,
}

/// Machine translation collaborator.
///
/// Implementations are opaque to the rest of the crate: any failure is
/// reported to the user as a generic translation failure.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the language identified by `target_code`.
    async fn translate(&self, text: &str, target_code: &str) -> Result<Translation>;

    fn name(&self) -> &'static str;
}

/// Client for the public Google Translate web endpoint (`client=gtx`).
///
/// The source language is always auto-detected.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry: RetryConfig::interactive(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_a/single", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_code: &str) -> Result<Translation> {
        let url = self.endpoint();

        let body = with_retry_if(
            &self.retry,
            &format!("Translation to {}", target_code),
            || async {
                let response = self
                    .client
                    .get(&url)
                    .query(&[
                        ("client", "gtx"),
                        ("sl", "auto"),
                        ("tl", target_code),
                        ("dt", "t"),
                        ("q", text),
                    ])
                    .send()
                    .await
                    .context("Failed to send request to translation service")?;

                let status = response.status();
                if !status.is_success() {
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    return Err(anyhow::Error::new(UpstreamStatus {
                        service: "Translation",
                        status,
                        body,
                    }));
                }

                response
                    .json::<Value>()
                    .await
                    .context("Failed to parse translation response")
            },
            is_retryable,
        )
        .await?;

        let translation = parse_translation(&body)?;
        debug!(
            "Translated {} chars to {} (detected source: {:?})",
            text.chars().count(),
            target_code,
            translation.detected_source
        );
        Ok(translation)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// Extract the translation from a `translate_a/single` response.
///
/// The service splits long input into segments at `[0][*][0]`; they are
/// concatenated in order. The detected source language sits at `[2]`.
fn parse_translation(body: &Value) -> Result<Translation> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .context("Invalid translation response format: missing segments")?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        anyhow::bail!("Empty translation received from translation service");
    }

    let detected_source = body
        .get(2)
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    Ok(Translation {
        text,
        detected_source,
    })
}
