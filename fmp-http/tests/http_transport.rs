use fmp_core::{ApiRequest, FmpConfig, FmpError, Query, Resource, Transport};
use fmp_http::HttpTransport;
use httpmock::prelude::*;
use serde_json::json;

fn transport_for(server: &MockServer) -> HttpTransport {
    let mut cfg = FmpConfig::new("test-key");
    cfg.base_url = server.url("/api/");
    HttpTransport::from_config(&cfg).expect("valid config")
}

#[tokio::test]
async fn get_json_sends_key_and_params() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/income-statement/AAPL")
                .query_param("apikey", "test-key")
                .query_param("period", "quarter")
                .query_param("limit", "2");
            then.status(200)
                .json_body(json!([{"date": "2024-06-29", "symbol": "AAPL", "revenue": 1}]));
        })
        .await;

    let t = transport_for(&server);
    let req = ApiRequest::new(
        Resource::v3("income-statement/AAPL"),
        Query::new().with("period", "quarter").with("limit", 2),
    );
    let body = t.get_json(&req).await.unwrap();

    mock.assert_async().await;
    assert_eq!(body[0]["symbol"], json!("AAPL"));
}

#[tokio::test]
async fn server_error_maps_to_transport_with_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v4/stock_peers");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let t = transport_for(&server);
    let err = t
        .get_json(&ApiRequest::bare(Resource::v4("stock_peers")))
        .await
        .unwrap_err();

    match err {
        FmpError::Transport { status, msg } => {
            assert_eq!(status, Some(503));
            assert!(msg.contains("upstream unavailable"));
            assert!(!msg.contains("test-key"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_message_body_maps_to_api() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/profile/AAPL");
            then.status(200)
                .json_body(json!({"Error Message": "Invalid API KEY. Please retry."}));
        })
        .await;

    let t = transport_for(&server);
    let err = t
        .get_json(&ApiRequest::bare(Resource::v3("profile/AAPL")))
        .await
        .unwrap_err();
    assert_eq!(err, FmpError::api("Invalid API KEY. Please retry."));
}

#[tokio::test]
async fn empty_page_is_returned_as_empty_array() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v4/institutional-ownership/institutional-holders/symbol-ownership-percent")
                .query_param("page", "3");
            then.status(200).json_body(json!([]));
        })
        .await;

    let t = transport_for(&server);
    let req = ApiRequest::new(
        Resource::v4("institutional-ownership/institutional-holders/symbol-ownership-percent"),
        Query::new().with("symbol", "AAPL").with("page", 3),
    );
    assert_eq!(t.get_json(&req).await.unwrap(), json!([]));
}

#[tokio::test]
async fn refused_connection_has_no_status() {
    // Bind then drop a server so the port is closed.
    let base = {
        let server = MockServer::start_async().await;
        server.url("/api/")
    };
    let mut cfg = FmpConfig::new("k");
    cfg.base_url = base;
    let t = HttpTransport::from_config(&cfg).unwrap();

    let err = t
        .get_json(&ApiRequest::bare(Resource::v3("quote/AAPL")))
        .await
        .unwrap_err();
    assert!(matches!(err, FmpError::Transport { status: None, .. }));
    assert!(err.is_retryable());
}
