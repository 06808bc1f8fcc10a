//! Currency pairs (`EURUSD`, `USDJPY`, ...).

use fmp_core::{
    ApiRequest, DateRange, FmpError, IntoSymbols, PriceInterval, Resource, Symbols, Table,
    table_name,
};

use crate::Fmp;
use crate::api::{price_history, range_qualifiers};

impl Fmp {
    /// Handle for one or more currency pairs.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the pairs normalize to nothing.
    pub fn forex(&self, pairs: impl IntoSymbols) -> Result<Forex<'_>, FmpError> {
        Ok(Forex {
            fmp: self,
            pairs: pairs.into_symbols()?,
            persist: false,
        })
    }
}

/// Currency pair operations. Obtained from [`Fmp::forex`].
#[derive(Debug, Clone)]
pub struct Forex<'a> {
    fmp: &'a Fmp,
    pairs: Symbols,
    persist: bool,
}

impl Forex<'_> {
    /// Persist every table this handle returns.
    #[must_use]
    pub fn persist(mut self, yes: bool) -> Self {
        self.persist = yes;
        self
    }

    /// Normalized pairs.
    #[must_use]
    pub const fn pairs(&self) -> &Symbols {
        &self.pairs
    }

    /// Latest rates, one request for all pairs.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn quote(&self) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .fetch_table(ApiRequest::bare(Resource::v3(format!(
                "quote/{}",
                self.pairs.joined()
            ))))
            .await?;
        self.fmp
            .finish(self.persist, table_name(&self.pairs, "fx_quote", [""; 0]), table)
            .await
    }

    /// Rate history in `range` at `interval`.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn historical(
        &self,
        range: DateRange,
        interval: PriceInterval,
    ) -> Result<Table, FmpError> {
        let table = price_history(self.fmp, &self.pairs, range, interval).await?;
        let [from, to] = range_qualifiers(&range);
        self.fmp
            .finish(
                self.persist,
                table_name(&self.pairs, "fx", [interval.code().to_string(), from, to]),
                table,
            )
            .await
    }
}
