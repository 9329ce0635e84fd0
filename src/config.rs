use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: IpAddr,
    pub port: u16,

    // Usage tracking
    pub usage_ledger_path: PathBuf,
    pub history_log_path: PathBuf,

    // External services
    pub translate_api_url: String,
    pub speech_api_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Server
            host: std::env::var("HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string())
                .parse()
                .context("HOST must be a valid IP address")?,
            port: parse_var("PORT", 8501)?,

            // Usage tracking - relative to the working directory
            usage_ledger_path: std::env::var("USAGE_LEDGER_PATH")
                .unwrap_or_else(|_| "usage_log.csv".to_string())
                .into(),
            history_log_path: std::env::var("HISTORY_LOG_PATH")
                .unwrap_or_else(|_| "translation_log.txt".to_string())
                .into(),

            // External services
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| "https://translate.googleapis.com".to_string()),
            speech_api_url: std::env::var("SPEECH_API_URL")
                .unwrap_or_else(|_| "https://translate.google.com".to_string()),
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 10)?),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read a numeric variable, falling back to `default` only when it is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got '{}'", name, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "USAGE_LEDGER_PATH",
        "HISTORY_LOG_PATH",
        "TRANSLATE_API_URL",
        "SPEECH_API_URL",
        "HTTP_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8501");
        assert_eq!(config.usage_ledger_path, PathBuf::from("usage_log.csv"));
        assert_eq!(config.history_log_path, PathBuf::from("translation_log.txt"));
        assert_eq!(config.translate_api_url, "https://translate.googleapis.com");
        assert_eq!(config.speech_api_url, "https://translate.google.com");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("HOST", "0.0.0.0");
        std::env::set_var("PORT", "9000");
        std::env::set_var("USAGE_LEDGER_PATH", "data/usage.csv");
        std::env::set_var("HTTP_TIMEOUT_SECS", "3");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.usage_ledger_path, PathBuf::from("data/usage.csv"));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_an_error() {
        clear_env();
        std::env::set_var("PORT", "eighty");

        let result = Config::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    #[serial]
    fn test_invalid_host_is_an_error() {
        clear_env();
        std::env::set_var("HOST", "localhost:80");

        let result = Config::from_env();
        clear_env();

        assert!(result.is_err());
    }
}
