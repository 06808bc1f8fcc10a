//! fmp-core
//!
//! Core types and traits shared across the fmp workspace.
//!
//! - `symbols`: identifier normalization (`Symbols`, `IntoSymbols`).
//! - `request`: resources, query parameters, and page descriptors.
//! - `period`: statement frequency, quarters, date ranges, price intervals.
//! - [`Transport`]: the single seam for HTTP access.
//! - [`Persistence`]: the single seam for storing tables.
//!
//! Error, configuration, and table types come from `fmp-types` and are
//! re-exported here.
#![warn(missing_docs)]

mod persistence;
pub mod period;
pub mod request;
pub mod symbols;
mod transport;

pub use fmp_types::*;
pub use period::{DateRange, Frequency, PriceInterval, Quarter};
pub use persistence::{Persistence, table_name};
pub use request::{ApiRequest, ApiVersion, PAGE_PARAM, PageRequest, PageResult, Query, Resource};
pub use symbols::{IntoSymbols, Symbols};
pub use transport::Transport;
