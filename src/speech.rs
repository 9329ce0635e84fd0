use crate::retry::{is_retryable, with_retry_if, RetryConfig, UpstreamStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Longest text the TTS endpoint accepts in one request
pub const MAX_CHUNK_CHARS: usize = 200;

/// Text-to-speech collaborator. Returns encoded audio (MP3 for the Google client).
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>>;

    /// MIME type of the audio returned by `synthesize`
    fn content_type(&self) -> &'static str;
}

/// Client for the Google Translate TTS endpoint (`client=tw-ob`).
#[derive(Debug, Clone)]
pub struct GoogleSpeech {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl GoogleSpeech {
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
        format!("{}/translate_tts", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_chunk(
        &self,
        url: &str,
        chunk: &str,
        lang_code: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();

        with_retry_if(
            &self.retry,
            &format!("Speech chunk {}/{} ({})", idx, total, lang_code),
            || async {
                let response = self
                    .client
                    .get(url)
                    .query(&[
                        ("ie", "UTF-8"),
                        ("client", "tw-ob"),
                        ("tl", lang_code),
                        ("q", chunk),
                        ("idx", idx.as_str()),
                        ("total", total.as_str()),
                        ("textlen", textlen.as_str()),
                    ])
                    .send()
                    .await
                    .context("Failed to send request to speech service")?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(anyhow::Error::new(UpstreamStatus {
                        service: "Speech",
                        status,
                        body,
                    }));
                }

                let bytes = response
                    .bytes()
                    .await
                    .context("Failed to read speech response body")?;
                Ok(bytes.to_vec())
            },
            is_retryable,
        )
        .await
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            anyhow::bail!("No text to speak");
        }

        let url = self.endpoint();
        let mut audio = Vec::new();
        // MP3 frames are self-delimiting, so the chunk bodies can simply be joined
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self
                .fetch_chunk(&url, chunk, lang_code, idx, chunks.len())
                .await?;
            if bytes.is_empty() {
                anyhow::bail!("Speech service returned no audio for chunk {}", idx + 1);
            }
            audio.extend_from_slice(&bytes);
        }

        debug!(
            "Synthesized {} bytes of speech in {} chunk(s) for {}",
            audio.len(),
            chunks.len(),
            lang_code
        );
        Ok(audio)
    }

    fn content_type(&self) -> &'static str {
        "audio/mpeg"
    }
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Breaks on whitespace where possible; a single word longer than the limit
/// is cut at the character boundary. Whitespace-only input yields no chunks.
/// A limit of zero is treated as one.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Hard-split words that can never fit
        while word.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }

        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() { word.len() } else { word.len() + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn speech(server: &MockServer) -> GoogleSpeech {
        GoogleSpeech::new(reqwest::Client::new(), server.uri())
            .with_retry(RetryConfig::new(2, Duration::from_millis(1)))
    }

    // ==================== chunk_text Tests ====================

    #[test]
    fn test_chunk_short_text() {
        assert_eq!(chunk_text("Bonjour le monde", 200), vec!["Bonjour le monde"]);
    }

    #[test]
    fn test_chunk_whitespace_only() {
        assert!(chunk_text("  \n\t ", 200).is_empty());
        assert!(chunk_text("", 200).is_empty());
    }

    #[test]
    fn test_chunk_breaks_on_whitespace() {
        assert_eq!(chunk_text("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_chunk_collapses_whitespace() {
        assert_eq!(chunk_text("a \n  b", 10), vec!["a b"]);
    }

    #[test]
    fn test_chunk_splits_long_word() {
        assert_eq!(chunk_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunk_long_word_after_short_one() {
        assert_eq!(chunk_text("hi abcdefgh", 4), vec!["hi", "abcd", "efgh"]);
    }

    #[test]
    fn test_chunk_zero_limit_splits_per_character() {
        assert_eq!(chunk_text("ab c", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_chunk_counts_characters_not_bytes() {
        let text = "नमस्ते दुनिया";
        let chunks = chunk_text(text, 6);
        assert!(chunks.iter().all(|c| c.chars().count() <= 6));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_chunks_never_exceed_limit() {
        let text = "The quick brown fox jumps over the lazy dog ".repeat(20);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(chunks.join(" "), text.trim_end());
    }

    // ==================== Integration Tests with Wiremock ====================

    #[tokio::test]
    async fn test_synthesize_single_chunk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("client", "tw-ob"))
            .and(query_param("tl", "fr"))
            .and(query_param("q", "Bonjour"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90]))
            .expect(1)
            .mount(&server)
            .await;

        let audio = speech(&server).synthesize("Bonjour", "fr").await.unwrap();
        assert_eq!(audio, vec![0xFF, 0xFB, 0x90]);
    }

    #[tokio::test]
    async fn test_synthesize_joins_chunks_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![3]))
            .mount(&server)
            .await;

        let text = format!("{} {}", "a".repeat(150), "b".repeat(150));
        let audio = speech(&server).synthesize(&text, "en").await.unwrap();
        assert_eq!(audio, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_synthesize_empty_text() {
        let server = MockServer::start().await;
        assert!(speech(&server).synthesize("   ", "en").await.is_err());
    }

    #[tokio::test]
    async fn test_synthesize_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = speech(&server).synthesize("Hola", "es").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_synthesize_empty_audio() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(speech(&server).synthesize("Hola", "es").await.is_err());
    }

    #[test]
    fn test_content_type() {
        let speech = GoogleSpeech::new(reqwest::Client::new(), "https://example.com");
        assert_eq!(speech.content_type(), "audio/mpeg");
        assert_eq!(speech.endpoint(), "https://example.com/translate_tts");
    }
}
