//! Market indexes (`^GSPC`, `^IXIC`, `^DJI`, ...).

use fmp_core::{
    ApiRequest, DateRange, FmpError, IntoSymbols, PriceInterval, Resource, Symbols, Table,
    table_name,
};

use crate::Fmp;
use crate::api::{price_history, range_qualifiers};

impl Fmp {
    /// Handle for one or more index symbols.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the identifiers normalize to nothing.
    pub fn index(&self, ids: impl IntoSymbols) -> Result<Index<'_>, FmpError> {
        Ok(Index {
            fmp: self,
            symbols: ids.into_symbols()?,
            persist: false,
        })
    }
}

/// Index operations. Obtained from [`Fmp::index`].
#[derive(Debug, Clone)]
pub struct Index<'a> {
    fmp: &'a Fmp,
    symbols: Symbols,
    persist: bool,
}

impl Index<'_> {
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

    /// Latest index levels, one request for all symbols.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn quote(&self) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .fetch_table(ApiRequest::bare(Resource::v3(format!(
                "quote/{}",
                self.symbols.joined()
            ))))
            .await?;
        self.fmp
            .finish(self.persist, table_name(&self.symbols, "quote", [""; 0]), table)
            .await
    }

    /// Index levels in `range` at `interval`.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn historical_price(
        &self,
        range: DateRange,
        interval: PriceInterval,
    ) -> Result<Table, FmpError> {
        let table = price_history(self.fmp, &self.symbols, range, interval).await?;
        let [from, to] = range_qualifiers(&range);
        self.fmp
            .finish(
                self.persist,
                table_name(
                    &self.symbols,
                    "price",
                    [interval.code().to_string(), from, to],
                ),
                table,
            )
            .await
    }
}
