//! Report envelopes produced by fan-out helpers.

use serde::{Deserialize, Serialize};

use crate::error::FmpError;
use crate::table::Table;

/// Summary of a batch download across identifiers.
///
/// `tables` and `warnings` are both in the order the identifiers were given.
/// A failed identifier contributes a warning and no table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchReport {
    /// Successful results keyed by identifier.
    pub tables: Vec<(String, Table)>,
    /// Non-fatal failures keyed by identifier.
    pub warnings: Vec<(String, FmpError)>,
}

impl BatchReport {
    /// Look up the table produced for `identifier`.
    #[must_use]
    pub fn table(&self, identifier: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, t)| t)
    }

    /// True when every identifier succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}
