//! Async client for the Financial Modeling Prep REST API.
//!
//! Overview
//! - Entity handles (`Ticker`, `Funds`, `Index`, `Forex`, `Markets`,
//!   `Economics`) borrow a shared [`Fmp`] client and return tabular results.
//! - Every request goes through one [`Transport`]; HTTP (`fmp-http`) is the
//!   default, any other implementation can be injected through the builder.
//! - Paginated listings are collected by [`collect_pages`] in concurrent
//!   batches, always yielding the contiguous prefix of non-empty pages in
//!   page order.
//! - Tables are optionally written to a [`Persistence`] store (SQLite by
//!   default) when a handle is switched to `.persist(true)`.
//! - Transient failures can be retried with jittered backoff by supplying a
//!   [`RetryConfig`].
//!
//! Key behaviors and trade-offs
//! - Multi-identifier operations run one call per identifier with at most
//!   `batch_concurrency` in flight and fail on the first error in identifier
//!   order. [`Fmp::batch`] tolerates per-identifier failures instead.
//! - A page budget (`max_pages`) turns a listing that never ends into
//!   `PageLimitExceeded` rather than an endless loop.
//! - An empty response is an empty table, never an error.
//!
//! Examples
//! ```rust,ignore
//! use fmp::{DateRange, Fmp, FmpConfig, Frequency, PriceInterval};
//!
//! let fmp = Fmp::connect(FmpConfig::from_env()?).await?;
//! let income = fmp
//!     .ticker("AAPL,MSFT")?
//!     .persist(true)
//!     .income_statement(Frequency::Quarterly, Some(8))
//!     .await?;
//!
//! let range = DateRange::parse("2024-01-01", "2024-06-30")?;
//! let bars = fmp
//!     .index("^GSPC")?
//!     .historical_price(range, PriceInterval::Daily)
//!     .await?;
//! ```
#![warn(missing_docs)]

pub mod api;
mod core;
pub mod paginate;

pub use crate::api::economics::{EconomicIndicator, Economics};
pub use crate::api::forex::Forex;
pub use crate::api::funds::Funds;
pub use crate::api::index::Index;
pub use crate::api::markets::{IndexKind, Markets};
pub use crate::api::ticker::{SymbolList, Ticker};
pub use crate::core::{Fmp, FmpBuilder};
pub use crate::paginate::{collect_pages, fetch_page};

pub use fmp_core::{
    ApiRequest, ApiVersion, BatchReport, DEFAULT_BASE_URL, DateRange, ENV_API_KEY,
    ENV_DATABASE_PATH, FmpConfig, FmpError, Frequency, IntoSymbols, PAGE_PARAM, PageRequest,
    PageResult, Persistence, PriceInterval, Quarter, Query, Record, Resource, RetryConfig, Symbols,
    Table, Transport, records_from_payload, table_name,
};
pub use fmp_middleware::{RetryTransport, backoff_delay};

#[cfg(feature = "http")]
pub use fmp_http::HttpTransport;
#[cfg(feature = "sqlite")]
pub use fmp_sqlite::{SqliteStore, WriteMode};
