//! Market-wide listings that take no identifiers.

use fmp_core::{ApiRequest, FmpError, Resource, Table};
use serde::{Deserialize, Serialize};

use crate::Fmp;

/// Index families with published constituent lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// S&P 500.
    Sp500,
    /// Nasdaq 100.
    Nasdaq,
    /// Dow Jones Industrial Average.
    DowJones,
}

impl IndexKind {
    /// Path stem used by the constituent endpoints.
    #[must_use]
    pub const fn stem(self) -> &'static str {
        match self {
            Self::Sp500 => "sp500",
            Self::Nasdaq => "nasdaq",
            Self::DowJones => "dowjones",
        }
    }
}

impl Fmp {
    /// Handle for market-wide listings.
    #[must_use]
    pub const fn markets(&self) -> Markets<'_> {
        Markets {
            fmp: self,
            persist: false,
        }
    }
}

/// Market-wide listings. Obtained from [`Fmp::markets`].
#[derive(Debug, Clone, Copy)]
pub struct Markets<'a> {
    fmp: &'a Fmp,
    persist: bool,
}

impl Markets<'_> {
    /// Persist every table this handle returns.
    #[must_use]
    pub const fn persist(mut self, yes: bool) -> Self {
        self.persist = yes;
        self
    }

    async fn listing(&self, path: String, table_name: &str) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .fetch_table(ApiRequest::bare(Resource::v3(path)))
            .await?;
        self.fmp
            .finish(self.persist, table_name.to_string(), table)
            .await
    }

    /// Current members of `kind`.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn constituents(&self, kind: IndexKind) -> Result<Table, FmpError> {
        self.listing(
            format!("{}_constituent", kind.stem()),
            &format!("{}_constituents", kind.stem()),
        )
        .await
    }

    /// Additions to and removals from `kind` over time.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn historical_constituents(&self, kind: IndexKind) -> Result<Table, FmpError> {
        self.listing(
            format!("historical/{}_constituent", kind.stem()),
            &format!("{}_historical_constituents", kind.stem()),
        )
        .await
    }

    /// Latest levels of every index the provider covers.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn index_quotes(&self) -> Result<Table, FmpError> {
        self.listing("quotes/index".into(), "index_quotes").await
    }

    /// Every currency pair the provider covers.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn forex_pairs(&self) -> Result<Table, FmpError> {
        self.listing("symbol/available-forex-pairs".into(), "forex_pairs")
            .await
    }

    /// Latest rates of every currency pair.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn forex_quotes(&self) -> Result<Table, FmpError> {
        self.listing("quotes/forex".into(), "forex_quotes").await
    }
}
