mod helpers;

use std::time::Duration;

use fmp::{FmpError, Frequency};
use fmp_mock::MockBehavior;
use fmp_mock::fixtures::{income_statement, profile};
use helpers::*;

#[tokio::test]
async fn failures_become_warnings_in_input_order() {
    let h = harness_with(|b| b.batch_concurrency(2));
    h.mock
        .set_behavior(
            "v3/profile/AAPL",
            MockBehavior::Delay(Duration::from_millis(25), profile(AAPL)),
        )
        .await;
    h.mock.set_route("v3/profile/MSFT", profile(MSFT)).await;

    let report = h
        .fmp
        .batch("aapl,FAIL,msft,nope", |fmp, sym| async move {
            fmp.ticker(sym)?.profile().await
        })
        .await
        .unwrap();

    let ok: Vec<&str> = report.tables.iter().map(|(s, _)| s.as_str()).collect();
    let failed: Vec<&str> = report.warnings.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(ok, [AAPL, MSFT]);
    assert_eq!(failed, ["FAIL", "NOPE"]);
    assert!(!report.is_complete());
    assert_eq!(
        report.warnings[0].1,
        FmpError::transport(Some(500), "forced failure: v3/profile/FAIL")
    );
    assert_eq!(report.table(AAPL).map(fmp::Table::len), Some(1));
    assert!(h.mock.max_in_flight() <= 2);
}

#[tokio::test]
async fn complete_batch_has_no_warnings() {
    let h = harness();
    for sym in [AAPL, MSFT, TSLA] {
        h.mock
            .set_route(&format!("v3/income-statement/{sym}"), income_statement(sym, 2))
            .await;
    }
    let report = h
        .fmp
        .batch([AAPL, MSFT, TSLA], |fmp, sym| async move {
            fmp.ticker(sym)?
                .income_statement(Frequency::Annual, Some(2))
                .await
        })
        .await
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.tables.len(), 3);
    assert_eq!(strings(&report.tables[2].1, "symbol"), [TSLA, TSLA]);
}

#[tokio::test]
async fn empty_identifier_set_is_rejected() {
    let h = harness();
    let err = h
        .fmp
        .batch(Vec::<String>::new(), |fmp, sym| async move {
            fmp.ticker(sym)?.quote().await
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FmpError::InvalidArg(_)));
    assert!(h.mock.requests().await.is_empty());
}
