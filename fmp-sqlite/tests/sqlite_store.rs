use fmp_core::{FmpError, Persistence, Table};
use fmp_sqlite::{SqliteStore, WriteMode};
use serde_json::json;

fn holders(first: u32) -> Table {
    Table::from_payload(json!([
        {"symbol": "AAPL", "investorName": format!("FUND {first}"), "shares": 100, "weight": 0.5},
        {"symbol": "AAPL", "investorName": format!("FUND {}", first + 1), "shares": 50, "weight": null}
    ]))
    .unwrap()
}

#[tokio::test]
async fn replace_roundtrips_rows_and_types() {
    let store = SqliteStore::memory().await.unwrap();
    store.write_table("AAPL_holders", &holders(1)).await.unwrap();

    let back = store.read_table("AAPL_holders").await.unwrap();
    assert_eq!(back.columns(), ["symbol", "investorName", "shares", "weight"]);
    assert_eq!(back.len(), 2);
    assert_eq!(back.rows()[0]["shares"], json!(100));
    assert_eq!(back.rows()[0]["weight"], json!(0.5));
    assert_eq!(back.rows()[1]["weight"], json!(null));
}

#[tokio::test]
async fn replace_overwrites_previous_contents() {
    let store = SqliteStore::memory().await.unwrap();
    store.write_table("t", &holders(1)).await.unwrap();
    store.write_table("t", &holders(10)).await.unwrap();

    let back = store.read_table("t").await.unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.rows()[0]["investorName"], json!("FUND 10"));
}

#[tokio::test]
async fn append_keeps_rows_and_adds_columns() {
    let store = SqliteStore::memory().await.unwrap().with_mode(WriteMode::Append);
    store.write_table("t", &holders(1)).await.unwrap();
    let extra = Table::from_payload(json!([{"symbol": "MSFT", "cik": "0000789019"}])).unwrap();
    store.write_table("t", &extra).await.unwrap();

    let back = store.read_table("t").await.unwrap();
    assert_eq!(back.len(), 3);
    assert!(back.columns().iter().any(|c| c == "cik"));
    assert_eq!(back.rows()[2]["symbol"], json!("MSFT"));
    assert_eq!(back.rows()[2]["shares"], json!(null));
}

#[tokio::test]
async fn empty_table_is_not_written() {
    let store = SqliteStore::memory().await.unwrap();
    store.write_table("nothing", &Table::new()).await.unwrap();
    assert!(store.table_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn nested_values_are_stored_as_json_text() {
    let store = SqliteStore::memory().await.unwrap();
    let t = Table::from_payload(json!([{"symbol": "SPY", "tags": ["etf", "us"], "active": true}]))
        .unwrap();
    store.write_table("SPY_info", &t).await.unwrap();
    let back = store.read_table("SPY_info").await.unwrap();
    assert_eq!(back.rows()[0]["tags"], json!("[\"etf\",\"us\"]"));
    assert_eq!(back.rows()[0]["active"], json!(1));
}

#[tokio::test]
async fn file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fmp.sqlite");
    {
        let store = SqliteStore::connect(&path).await.unwrap();
        store.write_table("AAPL_profile", &holders(1)).await.unwrap();
        store.pool().close().await;
    }
    let store = SqliteStore::connect(&path).await.unwrap();
    assert_eq!(store.table_names().await.unwrap(), vec!["AAPL_profile".to_string()]);
}

#[tokio::test]
async fn missing_table_read_is_persistence_error() {
    let store = SqliteStore::memory().await.unwrap();
    let err = store.read_table("absent").await.unwrap_err();
    assert!(matches!(err, FmpError::Persistence(_)));
}
