//! Shared error, configuration, and tabular data types for the fmp workspace.
#![warn(missing_docs)]

mod config;
mod error;
mod reports;
mod table;

pub use config::{
    DEFAULT_BASE_URL, ENV_API_KEY, ENV_DATABASE_PATH, FmpConfig, RetryConfig,
};
pub use error::FmpError;
pub use reports::BatchReport;
pub use table::{Record, Table, records_from_payload, value_to_text};
