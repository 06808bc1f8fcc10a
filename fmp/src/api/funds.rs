//! ETF and mutual fund data.

use fmp_core::{ApiRequest, FmpError, IntoSymbols, Quarter, Query, Resource, Symbols, Table, table_name};
use serde_json::Value;

use crate::Fmp;
use crate::api::institutional_holders;

impl Fmp {
    /// Handle for one or more funds.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the identifiers normalize to nothing.
    pub fn funds(&self, ids: impl IntoSymbols) -> Result<Funds<'_>, FmpError> {
        Ok(Funds {
            fmp: self,
            symbols: ids.into_symbols()?,
            persist: false,
        })
    }
}

/// Fund operations. Obtained from [`Fmp::funds`].
#[derive(Debug, Clone)]
pub struct Funds<'a> {
    fmp: &'a Fmp,
    symbols: Symbols,
    persist: bool,
}

impl Funds<'_> {
    /// Persist every table this handle returns.
    #[must_use]
    pub fn persist(mut self, yes: bool) -> Self {
        self.persist = yes;
        self
    }

    /// Normalized identifiers.
    #[must_use]
    pub const fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// v3 `{path}/{symbol}` per fund, rows tagged with `column = symbol`.
    async fn tagged(&self, path: &str, column: &str, op: &str) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| async move {
                let table = self
                    .fmp
                    .fetch_table(ApiRequest::bare(Resource::v3(format!("{path}/{sym}"))))
                    .await?;
                Ok(table.with_column(column, &Value::String(sym)))
            })
            .await?;
        self.fmp
            .finish(self.persist, table_name(&self.symbols, op, [""; 0]), table)
            .await
    }

    /// Constituents held by each fund.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn holdings(&self) -> Result<Table, FmpError> {
        self.tagged("etf-holder", "fund", "holdings").await
    }

    /// Sector allocation of each fund.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn sector_weightings(&self) -> Result<Table, FmpError> {
        self.tagged("etf-sector-weightings", "fund", "sector_weightings")
            .await
    }

    /// Country allocation of each fund.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn country_weightings(&self) -> Result<Table, FmpError> {
        self.tagged("etf-country-weightings", "fund", "country_weightings")
            .await
    }

    /// Mutual funds holding each symbol.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn mutual_fund_holders(&self) -> Result<Table, FmpError> {
        self.tagged("mutual-fund-holder", "symbol", "mutual_fund_holders")
            .await
    }

    /// Fund metadata: issuer, expense ratio, AUM, inception date.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn info(&self) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| {
                self.fmp.fetch_table(ApiRequest::new(
                    Resource::v4("etf-info"),
                    Query::new().with("symbol", sym),
                ))
            })
            .await?;
        self.fmp
            .finish(self.persist, table_name(&self.symbols, "info", [""; 0]), table)
            .await
    }

    /// Every 13F holder of each fund for the quarter, collected page by page.
    ///
    /// # Errors
    /// `Fetch` naming the failing page; `PageLimitExceeded` past the page
    /// budget; persistence errors.
    pub async fn institutional_holders(
        &self,
        year: i32,
        quarter: Quarter,
    ) -> Result<Table, FmpError> {
        let table = institutional_holders(self.fmp, &self.symbols, year, quarter).await?;
        self.fmp
            .finish(
                self.persist,
                table_name(
                    &self.symbols,
                    "institutional_holders",
                    [year.to_string(), quarter.to_string()],
                ),
                table,
            )
            .await
    }
}
