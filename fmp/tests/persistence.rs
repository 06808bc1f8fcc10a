mod helpers;

use std::sync::Arc;

use fmp::{EconomicIndicator, Fmp, FmpError, Frequency, PriceInterval, Transport};
use fmp_mock::fixtures::{economic_series, historical_daily, income_statement, quote};
use fmp_mock::{MemoryStore, MockTransport};
use helpers::*;
use serde_json::json;

#[tokio::test]
async fn nothing_is_written_unless_asked() {
    let h = harness();
    h.mock
        .set_route("v3/income-statement/AAPL", income_statement(AAPL, 2))
        .await;
    h.fmp
        .ticker(AAPL)
        .unwrap()
        .income_statement(Frequency::Annual, None)
        .await
        .unwrap();
    assert!(h.store.writes().await.is_empty());
}

#[tokio::test]
async fn persisted_tables_are_named_after_symbols_operation_and_qualifiers() {
    let h = harness();
    h.mock
        .set_route("v3/income-statement/AAPL", income_statement(AAPL, 2))
        .await;
    h.mock
        .set_route("v3/income-statement/MSFT", income_statement(MSFT, 1))
        .await;
    h.mock
        .set_route("v3/historical-price-full/TSLA", historical_daily(TSLA, 2))
        .await;
    h.mock.set_route("v4/economic", economic_series(2)).await;

    let income = h
        .fmp
        .ticker("AAPL,MSFT")
        .unwrap()
        .persist(true)
        .income_statement(Frequency::Quarterly, None)
        .await
        .unwrap();
    h.fmp
        .ticker(TSLA)
        .unwrap()
        .persist(true)
        .historical_price(january(), PriceInterval::Daily)
        .await
        .unwrap();
    h.fmp
        .economics()
        .persist(true)
        .indicator(EconomicIndicator::Cpi, january())
        .await
        .unwrap();

    assert_eq!(
        h.store.table_names().await,
        [
            "AAPL_MSFT_income_Q",
            "TSLA_price_d_2024_01_01_2024_01_31",
            "CPI_economic_2024_01_01_2024_01_31",
        ]
    );
    assert_eq!(h.store.table("AAPL_MSFT_income_Q").await, Some(income));
}

#[tokio::test]
async fn empty_tables_are_not_written() {
    let h = harness();
    h.mock.set_route("v3/quote/AAPL", json!([])).await;
    let table = h
        .fmp
        .ticker(AAPL)
        .unwrap()
        .persist(true)
        .quote()
        .await
        .unwrap();
    assert!(table.is_empty());
    assert!(h.store.writes().await.is_empty());
}

#[tokio::test]
async fn persist_without_store_still_returns_the_table() {
    let mock = Arc::new(MockTransport::new());
    mock.set_route("v3/quote/AAPL", quote(AAPL, 190.0)).await;
    let fmp = storeless(&mock);

    let table = fmp.ticker(AAPL).unwrap().persist(true).quote().await.unwrap();
    assert_eq!(table.len(), 1);
    assert!(fmp.store().is_none());
}

#[tokio::test]
async fn store_failures_propagate() {
    let mock = Arc::new(MockTransport::new());
    mock.set_route("v3/quote/AAPL", quote(AAPL, 190.0)).await;
    let fmp = Fmp::builder()
        .transport(mock as Arc<dyn Transport>)
        .store(Arc::new(MemoryStore::failing("disk full")))
        .build()
        .unwrap();

    let err = fmp
        .ticker(AAPL)
        .unwrap()
        .persist(true)
        .quote()
        .await
        .unwrap_err();
    assert_eq!(err, FmpError::Persistence("disk full".into()));

    // the same call without persistence is unaffected
    assert!(fmp.ticker(AAPL).unwrap().quote().await.is_ok());
}
