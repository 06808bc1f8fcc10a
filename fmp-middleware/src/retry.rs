use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fmp_core::{ApiRequest, FmpError, RetryConfig, Transport};
use rand::Rng;
use serde_json::Value;

/// Delay before retry number `attempt` (0 = first retry), without jitter.
///
/// `min_backoff_ms * factor^attempt`, capped at `max_backoff_ms`.
#[must_use]
pub fn backoff_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
    let mut ms = cfg.min_backoff_ms;
    for _ in 0..attempt {
        ms = ms.saturating_mul(u64::from(cfg.factor.max(1)));
        if ms >= cfg.max_backoff_ms {
            break;
        }
    }
    Duration::from_millis(ms.min(cfg.max_backoff_ms))
}

fn with_jitter(base: Duration, jitter_percent: u8) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, base_ms.saturating_mul(u64::from(jitter_percent.min(100))) / 100)
    };
    Duration::from_millis(base_ms.saturating_add(rand::rng().random_range(0..range)))
}

/// Retries transient failures of its inner transport with exponential backoff.
///
/// Only errors for which [`FmpError::is_retryable`] holds are retried: no
/// status, 429, or 5xx. Provider `Api` errors and 4xx statuses are returned
/// on the first attempt.
pub struct RetryTransport {
    inner: Arc<dyn Transport>,
    cfg: RetryConfig,
}

impl RetryTransport {
    /// Wrap `inner`. `cfg.max_attempts` is clamped to at least one.
    pub fn new(inner: Arc<dyn Transport>, cfg: RetryConfig) -> Self {
        Self { inner, cfg }
    }

    /// Active retry policy.
    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.cfg
    }
}

#[async_trait]
impl Transport for RetryTransport {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn get_json(&self, req: &ApiRequest) -> Result<Value, FmpError> {
        let attempts = self.cfg.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match self.inner.get_json(req).await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay =
                        with_jitter(backoff_delay(&self.cfg, attempt), self.cfg.jitter_percent);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        target = "fmp::retry",
                        resource = %req.resource,
                        attempt = attempt + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
