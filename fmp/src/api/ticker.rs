//! Company-level data: statements, metrics, ownership, news, prices.

use std::collections::HashSet;

use fmp_core::{
    ApiRequest, DateRange, FmpError, Frequency, IntoSymbols, PriceInterval, Quarter, Query,
    Record, Resource, Symbols, Table, table_name,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Fmp;
use crate::api::{institutional_holders, price_history, range_qualifiers};

/// Provider symbol directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SymbolList {
    /// Symbols with financial statements.
    #[default]
    Statements,
    /// Symbols currently traded.
    Tradable,
}

impl SymbolList {
    const fn path(self) -> &'static str {
        match self {
            Self::Statements => "financial-statement-symbol-lists",
            Self::Tradable => "available-traded/list",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Fundamental {
    Income,
    BalanceSheet,
    CashFlow,
    Ratios,
    KeyMetrics,
    Growth,
}

impl Fundamental {
    const fn path(self) -> &'static str {
        match self {
            Self::Income => "income-statement",
            Self::BalanceSheet => "balance-sheet-statement",
            Self::CashFlow => "cash-flow-statement",
            Self::Ratios => "ratios",
            Self::KeyMetrics => "key-metrics",
            Self::Growth => "financial-growth",
        }
    }

    const fn op(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
            Self::Ratios => "ratios",
            Self::KeyMetrics => "key_metrics",
            Self::Growth => "growth",
        }
    }
}

impl Fmp {
    /// Handle for one or more tickers.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the identifiers normalize to nothing.
    pub fn ticker(&self, ids: impl IntoSymbols) -> Result<Ticker<'_>, FmpError> {
        Ok(Ticker {
            fmp: self,
            symbols: ids.into_symbols()?,
            persist: false,
        })
    }

    /// Symbols the provider lists in `list`.
    ///
    /// # Errors
    /// Propagates transport errors; `Data` if the listing has no symbols.
    pub async fn available_symbols(&self, list: SymbolList) -> Result<Vec<String>, FmpError> {
        let payload = self
            .transport
            .get_json(&ApiRequest::bare(Resource::v3(list.path())))
            .await?;
        let Value::Array(items) = payload else {
            return Err(FmpError::Data(format!(
                "{}: expected a list of symbols",
                list.path()
            )));
        };
        Ok(items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("symbol").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect())
    }

    /// Like [`Fmp::ticker`], but rejects identifiers missing from `list`.
    ///
    /// # Errors
    /// Returns `InvalidArg` naming every unknown identifier.
    pub async fn ticker_checked(
        &self,
        ids: impl IntoSymbols,
        list: SymbolList,
    ) -> Result<Ticker<'_>, FmpError> {
        let ticker = self.ticker(ids)?;
        let known: HashSet<String> = self
            .available_symbols(list)
            .await?
            .into_iter()
            .map(|s| s.to_ascii_uppercase())
            .collect();
        let missing: Vec<&str> = ticker
            .symbols
            .iter()
            .filter(|s| !known.contains(*s))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(FmpError::InvalidArg(format!(
                "not valid tickers: {}",
                missing.join(" ")
            )));
        }
        Ok(ticker)
    }
}

/// Ticker operations. Obtained from [`Fmp::ticker`].
#[derive(Debug, Clone)]
pub struct Ticker<'a> {
    fmp: &'a Fmp,
    symbols: Symbols,
    persist: bool,
}

impl Ticker<'_> {
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

    fn name<Q: AsRef<str>>(&self, op: &str, qualifiers: impl IntoIterator<Item = Q>) -> String {
        table_name(&self.symbols, op, qualifiers)
    }

    async fn fundamental(
        &self,
        kind: Fundamental,
        freq: Frequency,
        limit: Option<u32>,
    ) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| {
                let req = ApiRequest::new(
                    Resource::v3(format!("{}/{sym}", kind.path())),
                    Query::new()
                        .with_opt("period", freq.period_param())
                        .with_opt("limit", limit),
                );
                self.fmp.fetch_table(req)
            })
            .await?;
        self.fmp
            .finish(self.persist, self.name(kind.op(), [freq.code()]), table)
            .await
    }

    /// Income statements, newest first.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn income_statement(
        &self,
        freq: Frequency,
        limit: Option<u32>,
    ) -> Result<Table, FmpError> {
        self.fundamental(Fundamental::Income, freq, limit).await
    }

    /// Balance sheet statements.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn balance_sheet(
        &self,
        freq: Frequency,
        limit: Option<u32>,
    ) -> Result<Table, FmpError> {
        self.fundamental(Fundamental::BalanceSheet, freq, limit)
            .await
    }

    /// Cash flow statements.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn cash_flow(&self, freq: Frequency, limit: Option<u32>) -> Result<Table, FmpError> {
        self.fundamental(Fundamental::CashFlow, freq, limit).await
    }

    /// Financial ratios.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn financial_ratios(
        &self,
        freq: Frequency,
        limit: Option<u32>,
    ) -> Result<Table, FmpError> {
        self.fundamental(Fundamental::Ratios, freq, limit).await
    }

    /// Key metrics (valuation and per-share figures).
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn key_metrics(&self, freq: Frequency, limit: Option<u32>) -> Result<Table, FmpError> {
        self.fundamental(Fundamental::KeyMetrics, freq, limit)
            .await
    }

    /// Growth of the main fundamentals.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn financial_growth(
        &self,
        freq: Frequency,
        limit: Option<u32>,
    ) -> Result<Table, FmpError> {
        self.fundamental(Fundamental::Growth, freq, limit).await
    }

    async fn segments(&self, path: &'static str, op: &str, freq: Frequency) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| {
                let req = ApiRequest::new(
                    Resource::v4(path),
                    Query::new()
                        .with("symbol", &sym)
                        .with_opt("period", freq.period_param()),
                );
                async move {
                    let payload = self.fmp.transport.get_json(&req).await?;
                    segments_table(&sym, payload)
                }
            })
            .await?;
        self.fmp
            .finish(self.persist, self.name(op, [freq.code()]), table)
            .await
    }

    /// Revenue by product line: one row per symbol, date and segment.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn product_segments(&self, freq: Frequency) -> Result<Table, FmpError> {
        self.segments("revenue-product-segmentation", "product_segments", freq)
            .await
    }

    /// Revenue by region: one row per symbol, date and segment.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn geographic_segments(&self, freq: Frequency) -> Result<Table, FmpError> {
        self.segments("revenue-geographic-segmentation", "geographic_segments", freq)
            .await
    }

    /// Earnings call transcripts for `year`; one quarter, or the whole year
    /// through the batch endpoint when `quarter` is `None`.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn transcripts(&self, year: i32, quarter: Option<Quarter>) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| {
                let req = match quarter {
                    Some(q) => ApiRequest::new(
                        Resource::v3(format!("earning_call_transcript/{sym}")),
                        Query::new().with("year", year).with("quarter", q.get()),
                    ),
                    None => ApiRequest::new(
                        Resource::v4(format!("batch_earning_call_transcript/{sym}")),
                        Query::new().with("year", year),
                    ),
                };
                self.fmp.fetch_table(req)
            })
            .await?;
        let q = quarter.map(|q| q.to_string()).unwrap_or_default();
        self.fmp
            .finish(
                self.persist,
                self.name("transcripts", [year.to_string(), q]),
                table,
            )
            .await
    }

    /// Quarterly 13F ownership summary.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn institutional_ownership(
        &self,
        include_current_quarter: bool,
    ) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| {
                self.fmp.fetch_table(ApiRequest::new(
                    Resource::v4("institutional-ownership/symbol-ownership"),
                    Query::new()
                        .with("symbol", sym)
                        .with("includeCurrentQuarter", include_current_quarter),
                ))
            })
            .await?;
        self.fmp
            .finish(self.persist, self.name("ownership", [""; 0]), table)
            .await
    }

    /// Every 13F holder for the quarter, collected page by page.
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
                self.name("institutional_holders", [year.to_string(), quarter.to_string()]),
                table,
            )
            .await
    }

    /// [`Ticker::institutional_holders`] for the latest quarter whose filings
    /// are complete (the quarter containing the day 90 days ago).
    ///
    /// # Errors
    /// As [`Ticker::institutional_holders`].
    pub async fn latest_institutional_holders(&self) -> Result<Table, FmpError> {
        let (year, quarter) = Quarter::last_reported(chrono::Local::now().date_naive());
        self.institutional_holders(year, quarter).await
    }

    /// News articles in `range`, all symbols in one paginated listing.
    ///
    /// # Errors
    /// `Fetch` naming the failing page; persistence errors.
    pub async fn news(&self, range: DateRange) -> Result<Table, FmpError> {
        let (from, to) = range.params();
        let query = Query::new()
            .with("tickers", self.symbols.joined())
            .with("from", from)
            .with("to", to);
        let table = self.fmp.collect(&Resource::v3("stock_news"), &query).await?;
        self.fmp
            .finish(self.persist, self.name("news", range_qualifiers(&range)), table)
            .await
    }

    /// Peer companies: one row per symbol and peer.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn peers(&self) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| async move {
                let req = ApiRequest::new(Resource::v4("stock_peers"), Query::new().with("symbol", sym));
                let payload = self.fmp.transport.get_json(&req).await?;
                peers_table(payload)
            })
            .await?;
        self.fmp
            .finish(self.persist, self.name("peers", [""; 0]), table)
            .await
    }

    /// CIK, exchange, SIC code and addresses.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn core_information(&self) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| {
                self.fmp.fetch_table(ApiRequest::new(
                    Resource::v4("company-core-information"),
                    Query::new().with("symbol", sym),
                ))
            })
            .await?;
        self.fmp
            .finish(self.persist, self.name("core_information", [""; 0]), table)
            .await
    }

    /// Company profiles, one request for all symbols.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn profile(&self) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .fetch_table(ApiRequest::bare(Resource::v3(format!(
                "profile/{}",
                self.symbols.joined()
            ))))
            .await?;
        self.fmp
            .finish(self.persist, self.name("profile", [""; 0]), table)
            .await
    }

    /// Key executives, tagged with the symbol they belong to.
    ///
    /// # Errors
    /// Propagates transport, provider and persistence errors.
    pub async fn executives(&self) -> Result<Table, FmpError> {
        let table = self
            .fmp
            .per_symbol(&self.symbols, |sym| async move {
                let table = self
                    .fmp
                    .fetch_table(ApiRequest::bare(Resource::v3(format!("key-executives/{sym}"))))
                    .await?;
                Ok(table.with_column("symbol", &Value::String(sym)))
            })
            .await?;
        self.fmp
            .finish(self.persist, self.name("executives", [""; 0]), table)
            .await
    }

    /// Latest quotes, one request for all symbols.
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
            .finish(self.persist, self.name("quote", [""; 0]), table)
            .await
    }

    /// Price bars in `range` at `interval`.
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
                self.name("price", [interval.code().to_string(), from, to]),
                table,
            )
            .await
    }
}

/// Flatten `[{date: {segment: value}}]` into `{symbol, date, segment, value}` rows.
/// Payloads of any other shape go through the generic shaper.
fn segments_table(symbol: &str, payload: Value) -> Result<Table, FmpError> {
    let nested = match &payload {
        Value::Array(items) => items.iter().all(|item| {
            item.as_object()
                .is_some_and(|o| o.values().all(Value::is_object))
        }),
        _ => false,
    };
    if !nested {
        return Table::from_payload(payload);
    }
    let mut table = Table::new();
    if let Value::Array(items) = payload {
        for item in items {
            let Value::Object(by_date) = item else { continue };
            for (date, segments) in by_date {
                let Value::Object(segments) = segments else { continue };
                for (segment, value) in segments {
                    let mut r = Record::new();
                    r.insert("symbol".into(), Value::String(symbol.to_string()));
                    r.insert("date".into(), Value::String(date.clone()));
                    r.insert("segment".into(), Value::String(segment));
                    r.insert("value".into(), value);
                    table.push(r);
                }
            }
        }
    }
    Ok(table)
}

/// Explode `[{symbol, peersList: [..]}]` into `{symbol, peer}` rows.
fn peers_table(payload: Value) -> Result<Table, FmpError> {
    let table = Table::from_payload(payload)?;
    if !table.columns().iter().any(|c| c == "peersList") {
        return Ok(table);
    }
    let mut out = Table::new();
    for row in table.into_rows() {
        let symbol = row.get("symbol").cloned().unwrap_or(Value::Null);
        let Some(Value::Array(peers)) = row.get("peersList") else {
            continue;
        };
        for peer in peers {
            let mut r = Record::new();
            r.insert("symbol".into(), symbol.clone());
            r.insert("peer".into(), peer.clone());
            out.push(r);
        }
    }
    Ok(out)
}
