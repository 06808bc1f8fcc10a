//! US macroeconomic series.

use std::fmt;

use fmp_core::{ApiRequest, DateRange, FmpError, Query, Resource, Table, table_name};
use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Fmp;
use crate::api::range_qualifiers;

/// Series served by the `economic` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EconomicIndicator {
    Gdp,
    RealGdp,
    NominalPotentialGdp,
    RealGdpPerCapita,
    FederalFunds,
    Cpi,
    InflationRate,
    Inflation,
    RetailSales,
    ConsumerSentiment,
    DurableGoods,
    UnemploymentRate,
    TotalNonfarmPayroll,
    InitialClaims,
    IndustrialProductionTotalIndex,
    NewPrivatelyOwnedHousingUnitsStartedTotalUnits,
    TotalVehicleSales,
    RetailMoneyFunds,
    SmoothedUsRecessionProbabilities,
    CertificatesOfDeposit3Month,
    CreditCardInterestRate,
    Mortgage30YearFixed,
    Mortgage15YearFixed,
}

impl EconomicIndicator {
    /// Every series, in the provider's documentation order.
    pub const ALL: [Self; 23] = [
        Self::Gdp,
        Self::RealGdp,
        Self::NominalPotentialGdp,
        Self::RealGdpPerCapita,
        Self::FederalFunds,
        Self::Cpi,
        Self::InflationRate,
        Self::Inflation,
        Self::RetailSales,
        Self::ConsumerSentiment,
        Self::DurableGoods,
        Self::UnemploymentRate,
        Self::TotalNonfarmPayroll,
        Self::InitialClaims,
        Self::IndustrialProductionTotalIndex,
        Self::NewPrivatelyOwnedHousingUnitsStartedTotalUnits,
        Self::TotalVehicleSales,
        Self::RetailMoneyFunds,
        Self::SmoothedUsRecessionProbabilities,
        Self::CertificatesOfDeposit3Month,
        Self::CreditCardInterestRate,
        Self::Mortgage30YearFixed,
        Self::Mortgage15YearFixed,
    ];

    /// Value of the `name` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gdp => "GDP",
            Self::RealGdp => "realGDP",
            Self::NominalPotentialGdp => "nominalPotentialGDP",
            Self::RealGdpPerCapita => "realGDPPerCapita",
            Self::FederalFunds => "federalFunds",
            Self::Cpi => "CPI",
            Self::InflationRate => "inflationRate",
            Self::Inflation => "inflation",
            Self::RetailSales => "retailSales",
            Self::ConsumerSentiment => "consumerSentiment",
            Self::DurableGoods => "durableGoods",
            Self::UnemploymentRate => "unemploymentRate",
            Self::TotalNonfarmPayroll => "totalNonfarmPayroll",
            Self::InitialClaims => "initialClaims",
            Self::IndustrialProductionTotalIndex => "industrialProductionTotalIndex",
            Self::NewPrivatelyOwnedHousingUnitsStartedTotalUnits => {
                "newPrivatelyOwnedHousingUnitsStartedTotalUnits"
            }
            Self::TotalVehicleSales => "totalVehicleSales",
            Self::RetailMoneyFunds => "retailMoneyFunds",
            Self::SmoothedUsRecessionProbabilities => "smoothedUSRecessionProbabilities",
            Self::CertificatesOfDeposit3Month => "3MonthOr90DayRatesAndYieldsCertificatesOfDeposit",
            Self::CreditCardInterestRate => "commercialBankInterestRateOnCreditCardPlansAllAccounts",
            Self::Mortgage30YearFixed => "30YearFixedRateMortgageAverage",
            Self::Mortgage15YearFixed => "15YearFixedRateMortgageAverage",
        }
    }
}

impl fmt::Display for EconomicIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Fmp {
    /// Handle for macroeconomic series.
    #[must_use]
    pub const fn economics(&self) -> Economics<'_> {
        Economics {
            fmp: self,
            persist: false,
        }
    }
}

/// Macroeconomic series. Obtained from [`Fmp::economics`].
#[derive(Debug, Clone, Copy)]
pub struct Economics<'a> {
    fmp: &'a Fmp,
    persist: bool,
}

impl Economics<'_> {
    /// Persist every table this handle returns.
    #[must_use]
    pub const fn persist(mut self, yes: bool) -> Self {
        self.persist = yes;
        self
    }

    async fn series(&self, indicator: EconomicIndicator, range: DateRange) -> Result<Table, FmpError> {
        let (from, to) = range.params();
        let req = ApiRequest::new(
            Resource::v4("economic"),
            Query::new()
                .with("name", indicator.as_str())
                .with("from", from)
                .with("to", to),
        );
        let table = self.fmp.fetch_table(req).await?;
        Ok(table.with_column("name", &Value::String(indicator.as_str().into())))
    }

    /// Observations of one series in `range`, tagged with its `name`.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn indicator(
        &self,
        indicator: EconomicIndicator,
        range: DateRange,
    ) -> Result<Table, FmpError> {
        let table = self.series(indicator, range).await?;
        self.fmp
            .finish(
                self.persist,
                table_name([indicator.as_str()], "economic", range_qualifiers(&range)),
                table,
            )
            .await
    }

    /// Several series fetched concurrently (up to `batch_concurrency` at a
    /// time) and concatenated in the order given.
    ///
    /// # Errors
    /// `InvalidArg` for an empty list; otherwise the first failure in list order.
    pub async fn indicators(
        &self,
        indicators: &[EconomicIndicator],
        range: DateRange,
    ) -> Result<Table, FmpError> {
        if indicators.is_empty() {
            return Err(FmpError::InvalidArg("no economic indicators given".into()));
        }
        let tables: Vec<Table> = stream::iter(indicators.iter().map(|i| self.series(*i, range)))
            .buffered(self.fmp.cfg.batch_concurrency)
            .try_collect()
            .await?;
        let names = indicators.iter().map(|i| i.as_str());
        self.fmp
            .finish(
                self.persist,
                table_name(names, "economic", range_qualifiers(&range)),
                Table::concat(tables),
            )
            .await
    }
}
