//! Deterministic payloads shaped like the provider's responses.

mod fundamentals;
mod holders;
mod prices;

pub use fundamentals::{income_statement, profile};
pub use holders::{holder_pages, holder_record};
pub use prices::{economic_series, historical_daily, quote};
