use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the fmp workspace.
///
/// Covers argument validation, transport failures, provider-reported errors,
/// payload shape problems, and the page-tagged failure surfaced by paginated
/// collection.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FmpError {
    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Network failure or a non-2xx HTTP status.
    #[error("transport failed{}: {msg}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Transport {
        /// HTTP status when the server answered; `None` for connect/timeout failures.
        status: Option<u16>,
        /// Human-readable error message.
        msg: String,
    },

    /// The provider answered successfully but reported an error in the body.
    #[error("provider error: {msg}")]
    Api {
        /// Message returned by the provider.
        msg: String,
    },

    /// Issues with the returned payload (unexpected shape, undecodable JSON).
    #[error("data issue: {0}")]
    Data(String),

    /// A page fetch failed during paginated collection.
    #[error("fetch of page {page} failed: {source}")]
    Fetch {
        /// Zero-based index of the page that failed.
        page: u32,
        /// Underlying failure.
        #[source]
        source: Box<FmpError>,
    },

    /// Pagination did not end within the configured page budget.
    #[error("pagination did not end within {max_pages} pages")]
    PageLimitExceeded {
        /// Configured page budget.
        max_pages: u32,
    },

    /// The persistence backend rejected a write.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FmpError {
    /// Helper: build a `Transport` error.
    pub fn transport(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Transport {
            status,
            msg: msg.into(),
        }
    }

    /// Helper: build an `Api` error from a provider message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api { msg: msg.into() }
    }

    /// Helper: tag `source` with the page index whose fetch failed.
    #[must_use]
    pub fn fetch(page: u32, source: Self) -> Self {
        Self::Fetch {
            page,
            source: Box::new(source),
        }
    }

    /// Page index carried by a `Fetch` error.
    #[must_use]
    pub const fn page(&self) -> Option<u32> {
        match self {
            Self::Fetch { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Returns true when repeating the same request may succeed.
    ///
    /// Connect/timeout failures (no status), HTTP 429 and 5xx are retryable.
    /// A `Fetch` error is classified by its source.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(s), ..
            } => *s == 429 || (500..600).contains(s),
            Self::Fetch { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for FmpError {
    fn from(e: serde_json::Error) -> Self {
        Self::Data(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(FmpError::transport(None, "connection reset").is_retryable());
        assert!(FmpError::transport(Some(503), "unavailable").is_retryable());
        assert!(FmpError::transport(Some(429), "slow down").is_retryable());
        assert!(!FmpError::transport(Some(401), "bad key").is_retryable());
        assert!(!FmpError::api("Invalid API KEY").is_retryable());
        assert!(FmpError::fetch(2, FmpError::transport(Some(502), "gw")).is_retryable());
    }

    #[test]
    fn fetch_error_carries_page_and_source() {
        let e = FmpError::fetch(3, FmpError::transport(Some(500), "boom"));
        assert_eq!(e.page(), Some(3));
        assert_eq!(
            e.to_string(),
            "fetch of page 3 failed: transport failed (status 500): boom"
        );
        let source = std::error::Error::source(&e).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("transport failed (status 500): boom")
        );
    }
}
