use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff policy for calls to the translation and speech services
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset for one interactive request: 3 attempts, waits of 500ms then 1s,
    /// so a user is never kept waiting on retries for more than ~1.5s.
    pub fn interactive() -> Self {
        Self::new(3, Duration::from_millis(500)).with_max_delay(Duration::from_secs(2))
    }

    /// Delay before attempt `attempt` (0-indexed; the first attempt never waits)
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects the error, or
/// the attempts run out. Returns the last error in the latter two cases.
///
/// # Panics
/// Panics if `config.max_attempts` is 0
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut attempt = 0;
    loop {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!(
                "{}: waiting {:?} before attempt {}/{}",
                operation_name,
                delay,
                attempt + 1,
                config.max_attempts
            );
            sleep(delay).await;
        }

        let error = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{}: succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !should_retry(&error) {
            debug!("{}: not retrying: {}", operation_name, error);
            return Err(error);
        }

        attempt += 1;
        if attempt >= config.max_attempts {
            warn!(
                "{}: giving up after {} attempts: {}",
                operation_name, config.max_attempts, error
            );
            return Err(error);
        }

        warn!(
            "{}: attempt {}/{} failed ({}), retrying",
            operation_name, attempt, config.max_attempts, error
        );
    }
}

/// Non-success HTTP response from an upstream service.
#[derive(Debug, thiserror::Error)]
#[error("{service} API error ({status}): {body}")]
pub struct UpstreamStatus {
    pub service: &'static str,
    pub status: reqwest::StatusCode,
    pub body: String,
}

/// Whether an HTTP status is worth retrying: rate limiting and server errors.
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Retry 429/5xx responses and transport failures; other 4xx are final.
pub fn is_retryable(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<UpstreamStatus>() {
        Some(upstream) => is_retryable_status(upstream.status),
        None => true,
    }
}
