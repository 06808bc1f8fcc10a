//! Entity handles and the requests they share.

pub mod batch;
pub mod economics;
pub mod forex;
pub mod funds;
pub mod index;
pub mod markets;
pub mod ticker;

use fmp_core::{ApiRequest, DateRange, FmpError, PriceInterval, Quarter, Query, Resource, Symbols, Table};
use serde_json::Value;

use crate::Fmp;

/// Price bars for each symbol, concatenated in symbol order.
///
/// Daily bars come from `historical-price-full` (symbol injected by the
/// payload shaper); intraday bars from `historical-chart/{interval}` with the
/// symbol added as a column.
pub(crate) async fn price_history(
    fmp: &Fmp,
    symbols: &Symbols,
    range: DateRange,
    interval: PriceInterval,
) -> Result<Table, FmpError> {
    let (from, to) = range.params();
    fmp.per_symbol(symbols, |sym| {
        let query = Query::new().with("from", &from).with("to", &to);
        async move {
            match interval.chart_segment() {
                None => {
                    let resource = Resource::v3(format!("historical-price-full/{sym}"));
                    fmp.fetch_table(ApiRequest::new(resource, query))
                        .await
                }
                Some(seg) => {
                    let resource = Resource::v3(format!("historical-chart/{seg}/{sym}"));
                    let table = fmp
                        .fetch_table(ApiRequest::new(resource, query))
                        .await?;
                    Ok(table.with_column("symbol", &Value::String(sym)))
                }
            }
        }
    })
    .await
}

/// 13F holders of each symbol for the quarter ending in `year`, one
/// paginated collection per symbol.
pub(crate) async fn institutional_holders(
    fmp: &Fmp,
    symbols: &Symbols,
    year: i32,
    quarter: Quarter,
) -> Result<Table, FmpError> {
    let date = quarter.end_date(year)?.format("%Y-%m-%d").to_string();
    let resource =
        Resource::v4("institutional-ownership/institutional-holders/symbol-ownership-percent");
    fmp.per_symbol(symbols, |sym| {
        let query = Query::new().with("symbol", sym).with("date", &date);
        let resource = &resource;
        async move { fmp.collect(resource, &query).await }
    })
    .await
}

/// `YYYY-MM-DD` bounds as table-name qualifiers.
pub(crate) fn range_qualifiers(range: &DateRange) -> [String; 2] {
    let (from, to) = range.params();
    [from, to]
}
