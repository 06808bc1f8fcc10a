//! fmp-http
//!
//! [`Transport`] implementation on top of `reqwest`. Every request is a GET to
//! `{base_url}{version}/{path}` with the API key as the first query parameter.
//!
//! Error normalization:
//! - connect/timeout failures map to `FmpError::Transport { status: None }`
//! - non-2xx statuses map to `FmpError::Transport { status: Some(code) }`
//! - a 2xx body of `{"Error Message": ...}` maps to `FmpError::Api`
//! - an undecodable body maps to `FmpError::Data`
#![warn(missing_docs)]

use async_trait::async_trait;
use fmp_core::{ApiRequest, FmpConfig, FmpError, Transport};
use serde_json::Value;
use url::Url;

/// Longest slice of an error body carried into an error message.
const ERROR_BODY_LIMIT: usize = 256;

/// Production transport backed by a shared `reqwest::Client`.
///
/// `reqwest::Client` is `Clone + Send + Sync` and pools connections, so one
/// transport can serve every concurrent page fetch.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base: Url,
    apikey: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Connector name reported by [`Transport::name`].
    pub const NAME: &'static str = "fmp-http";

    /// Build from configuration: base URL, key, and per-request timeout.
    ///
    /// # Errors
    /// Returns `Config` if the configuration is invalid, the base URL does not
    /// parse, or the HTTP client cannot be built.
    pub fn from_config(cfg: &FmpConfig) -> Result<Self, FmpError> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| FmpError::Config(format!("http client: {e}")))?;
        Self::with_client(http, &cfg.base_url, cfg.apikey.clone())
    }

    /// Build around an existing `reqwest::Client`.
    ///
    /// # Errors
    /// Returns `Config` if `base_url` does not parse or cannot be a base.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        apikey: impl Into<String>,
    ) -> Result<Self, FmpError> {
        let mut base =
            Url::parse(base_url).map_err(|e| FmpError::Config(format!("base_url: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FmpError::Config(format!(
                "base_url cannot be a base: {base_url}"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            apikey: apikey.into(),
        })
    }

    /// API root every request is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Full URL for `req`, including the API key.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the resource path cannot be joined onto the base.
    pub fn url_for(&self, req: &ApiRequest) -> Result<Url, FmpError> {
        let mut url = self
            .base
            .join(&format!("{}/{}", req.resource.version(), req.resource.path()))
            .map_err(|e| FmpError::InvalidArg(format!("resource {}: {e}", req.resource)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apikey", &self.apikey);
            for (k, v) in req.query.pairs() {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

fn map_reqwest_err(e: &reqwest::Error, context: &str) -> FmpError {
    let status = e.status().map(|s| s.as_u16());
    if e.is_timeout() {
        FmpError::transport(status, format!("timeout: {context}"))
    } else if e.is_connect() {
        FmpError::transport(status, format!("connect failed: {context}"))
    } else {
        FmpError::transport(status, format!("{context}: {e}"))
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

/// Decode a successful body; an empty body reads as `null`.
fn decode_body(bytes: &[u8], context: &str) -> Result<Value, FmpError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| FmpError::Data(format!("{context}: invalid JSON: {e}")))?;
    if let Some(msg) = value.get("Error Message") {
        let msg = msg.as_str().map_or_else(|| msg.to_string(), str::to_string);
        return Err(FmpError::api(msg));
    }
    Ok(value)
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "fmp_http::get_json",
            skip(self, req),
            fields(resource = %req.resource),
            err,
        )
    )]
    async fn get_json(&self, req: &ApiRequest) -> Result<Value, FmpError> {
        let context = req.resource.to_string();
        let url = self.url_for(req)?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_err(&e, &context))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| map_reqwest_err(&e, &context))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            #[cfg(feature = "tracing")]
            tracing::debug!(status = status.as_u16(), "non-success status");
            return Err(FmpError::transport(
                Some(status.as_u16()),
                format!("{context}: {}", truncate(body.trim())),
            ));
        }

        decode_body(&bytes, &context)
    }
}
