// Shared harness so tests can `use helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use fmp::{DateRange, Fmp, FmpBuilder, Persistence, Transport};
use fmp_mock::{MemoryStore, MockTransport};

pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";
pub const TSLA: &str = "TSLA";

/// Route of the paginated 13F holder listing.
pub const HOLDERS: &str = "v4/institutional-ownership/institutional-holders/symbol-ownership-percent";

pub struct Harness {
    pub fmp: Fmp,
    pub mock: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
}

/// Route spans and events to the test writer; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Client over a fresh mock with an in-memory store and default limits.
pub fn harness() -> Harness {
    harness_with(|b| b)
}

/// Like [`harness`], letting the test adjust the builder first.
pub fn harness_with(tweak: impl FnOnce(FmpBuilder) -> FmpBuilder) -> Harness {
    init_tracing();
    let mock = Arc::new(MockTransport::new());
    let store = Arc::new(MemoryStore::new());
    let builder = Fmp::builder()
        .transport(mock.clone() as Arc<dyn Transport>)
        .store(store.clone() as Arc<dyn Persistence>);
    let fmp = tweak(builder).build().unwrap();
    Harness { fmp, mock, store }
}

/// Client over `mock` without any store.
pub fn storeless(mock: &Arc<MockTransport>) -> Fmp {
    Fmp::builder()
        .transport(mock.clone() as Arc<dyn Transport>)
        .build()
        .unwrap()
}

pub fn january() -> DateRange {
    DateRange::parse("2024-01-01", "2024-01-31").unwrap()
}

/// Values of `column` as strings, `""` where missing.
pub fn strings(table: &fmp::Table, column: &str) -> Vec<String> {
    table
        .column(column)
        .map(|v| v.and_then(|v| v.as_str()).unwrap_or_default().to_string())
        .collect()
}
