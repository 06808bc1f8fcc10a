//! Configuration types shared by the client, transports, and middleware.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FmpError;

/// Default API root; the version segment (`v3`/`v4`) is appended per request.
pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "FMP_API_KEY";
/// Environment variable holding the optional sqlite database path.
pub const ENV_DATABASE_PATH: &str = "FMP_DATABASE_PATH";

/// Exponential backoff configuration for retrying transient transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first (>= 1).
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub min_backoff_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_backoff_ms: 250,
            max_backoff_ms: 5_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

/// Client configuration.
///
/// Only `apikey` is required when deserializing; every other field falls back
/// to [`FmpConfig::default`]. The key name matches the `{"apikey": "..."}`
/// layout of the provider's own config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmpConfig {
    /// API key appended to every request as the `apikey` query parameter.
    pub apikey: String,
    /// API root, ending with `/`.
    pub base_url: String,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// Concurrent page fetches per batch during paginated collection.
    pub page_concurrency: usize,
    /// Concurrent per-identifier operations in batch downloads and fan-outs.
    pub batch_concurrency: usize,
    /// Optional cap on pages fetched by one paginated collection.
    pub max_pages: Option<u32>,
    /// Optional retry policy; `None` performs each request exactly once.
    pub retry: Option<RetryConfig>,
    /// Optional sqlite database file used for persistence.
    pub database_path: Option<PathBuf>,
}

impl Default for FmpConfig {
    fn default() -> Self {
        Self {
            apikey: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            page_concurrency: 8,
            batch_concurrency: 10,
            max_pages: None,
            retry: None,
            database_path: None,
        }
    }
}

impl FmpConfig {
    /// Build a default configuration around an API key.
    pub fn new(apikey: impl Into<String>) -> Self {
        Self {
            apikey: apikey.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file such as `{"apikey": "..."}`.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read, parsed, or fails validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FmpError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FmpError::Config(format!("{}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&raw)
            .map_err(|e| FmpError::Config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `FMP_API_KEY` / `FMP_DATABASE_PATH`, reading a `.env` file first if present.
    ///
    /// # Errors
    /// Returns `Config` if the API key is missing or empty.
    pub fn from_env() -> Result<Self, FmpError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable lookup; used by [`FmpConfig::from_env`].
    ///
    /// # Errors
    /// Returns `Config` if the API key is missing or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FmpError> {
        let apikey = lookup(ENV_API_KEY)
            .ok_or_else(|| FmpError::Config(format!("{ENV_API_KEY} is not set")))?;
        let mut cfg = Self::new(apikey);
        cfg.database_path = lookup(ENV_DATABASE_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check invariants the client relies on.
    ///
    /// # Errors
    /// Returns `Config` for an empty key, zero concurrency, a zero page budget,
    /// or a retry policy with zero attempts.
    pub fn validate(&self) -> Result<(), FmpError> {
        if self.apikey.trim().is_empty() {
            return Err(FmpError::Config("apikey must not be empty".into()));
        }
        if self.page_concurrency == 0 || self.batch_concurrency == 0 {
            return Err(FmpError::Config(
                "concurrency limits must be positive".into(),
            ));
        }
        if self.max_pages == Some(0) {
            return Err(FmpError::Config("max_pages must be positive".into()));
        }
        if let Some(retry) = &self.retry
            && retry.max_attempts == 0
        {
            return Err(FmpError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
