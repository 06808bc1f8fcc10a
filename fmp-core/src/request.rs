//! Request and page descriptors passed to a [`Transport`](crate::Transport).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Record;

/// API generation a resource lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApiVersion {
    /// Free tier endpoints.
    #[default]
    V3,
    /// Premium endpoints.
    V4,
}

impl ApiVersion {
    /// Path segment for this version.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3 => "v3",
            Self::V4 => "v4",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named API resource: version plus path relative to the version root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    version: ApiVersion,
    path: String,
}

impl Resource {
    /// Build a resource; leading and trailing slashes are stripped from `path`.
    pub fn new(version: ApiVersion, path: impl AsRef<str>) -> Self {
        Self {
            version,
            path: path.as_ref().trim_matches('/').to_string(),
        }
    }

    /// Shortcut for a `v3` resource.
    pub fn v3(path: impl AsRef<str>) -> Self {
        Self::new(ApiVersion::V3, path)
    }

    /// Shortcut for a `v4` resource.
    pub fn v4(path: impl AsRef<str>) -> Self {
        Self::new(ApiVersion::V4, path)
    }

    /// API version.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.version
    }

    /// Path without surrounding slashes, e.g. `income-statement/AAPL`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.version, self.path)
    }
}

/// Ordered query parameters (the API key is added by the transport).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// Empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    /// Append a parameter when `value` is present.
    #[must_use]
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// One complete request for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Target resource.
    pub resource: Resource,
    /// Query parameters, excluding the API key.
    pub query: Query,
}

impl ApiRequest {
    /// Build a request.
    #[must_use]
    pub const fn new(resource: Resource, query: Query) -> Self {
        Self { resource, query }
    }

    /// Request with no parameters.
    #[must_use]
    pub const fn bare(resource: Resource) -> Self {
        Self {
            resource,
            query: Query::new(),
        }
    }
}

/// Query parameter carrying the zero-based page index.
pub const PAGE_PARAM: &str = "page";

/// Request for one page of a paginated listing. Constructed per fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Listing resource.
    pub resource: Resource,
    /// Zero-based page index.
    pub page: u32,
    /// Parameters other than the page index.
    pub query: Query,
}

impl PageRequest {
    /// Build a page request.
    #[must_use]
    pub const fn new(resource: Resource, page: u32, query: Query) -> Self {
        Self {
            resource,
            page,
            query,
        }
    }

    /// The transport request: `query` followed by `page=<index>`.
    #[must_use]
    pub fn to_api_request(&self) -> ApiRequest {
        ApiRequest::new(
            self.resource.clone(),
            self.query.clone().with(PAGE_PARAM, self.page),
        )
    }
}

/// Records returned for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Zero-based page index.
    pub page: u32,
    /// Records in provider order.
    pub records: Vec<Record>,
}

impl PageResult {
    /// True when the page carried no records, which ends pagination.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_trims_slashes() {
        let r = Resource::v3("/income-statement/AAPL/");
        assert_eq!(r.path(), "income-statement/AAPL");
        assert_eq!(r.to_string(), "v3/income-statement/AAPL");
    }

    #[test]
    fn page_request_appends_page_last() {
        let req = PageRequest::new(
            Resource::v4("institutional-ownership/institutional-holders/symbol-ownership-percent"),
            7,
            Query::new().with("symbol", "AAPL").with("date", "2024-03-31"),
        );
        let api = req.to_api_request();
        assert_eq!(
            api.query.pairs().last(),
            Some(&("page".to_string(), "7".to_string()))
        );
        assert_eq!(api.query.get("symbol"), Some("AAPL"));
    }

    #[test]
    fn with_opt_skips_none() {
        let q = Query::new().with_opt("quarter", None::<u8>).with_opt("year", Some(2024));
        assert_eq!(q.pairs(), [("year".to_string(), "2024".to_string())]);
    }
}
