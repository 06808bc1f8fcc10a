//! Reporting periods, quarters, date ranges, and price intervals.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::FmpError;

/// Statement cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Frequency {
    /// Fiscal-year rows.
    #[default]
    Annual,
    /// Fiscal-quarter rows.
    Quarterly,
}

impl Frequency {
    /// `period` query value, `None` for annual (the provider default).
    #[must_use]
    pub const fn period_param(self) -> Option<&'static str> {
        match self {
            Self::Annual => None,
            Self::Quarterly => Some("quarter"),
        }
    }

    /// Short code used in table names (`A`/`Q`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Annual => "A",
            Self::Quarterly => "Q",
        }
    }
}

/// Calendar quarter, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quarter(u8);

impl Quarter {
    /// Validate a quarter number.
    ///
    /// # Errors
    /// Returns `InvalidArg` unless `q` is within 1..=4.
    pub fn new(q: u8) -> Result<Self, FmpError> {
        if (1..=4).contains(&q) {
            Ok(Self(q))
        } else {
            Err(FmpError::InvalidArg(format!(
                "quarter must be between 1 and 4, got {q}"
            )))
        }
    }

    /// Quarter number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Last calendar day of this quarter in `year`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `year` is outside chrono's supported range.
    pub fn end_date(self, year: i32) -> Result<NaiveDate, FmpError> {
        let (month, day) = match self.0 {
            1 => (3, 31),
            2 => (6, 30),
            3 => (9, 30),
            _ => (12, 31),
        };
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| FmpError::InvalidArg(format!("unsupported year {year}")))
    }

    /// Year and quarter containing the day 90 days before `today`; the latest
    /// quarter whose 13F filings are reliably complete.
    #[must_use]
    pub fn last_reported(today: NaiveDate) -> (i32, Self) {
        let shifted = today - chrono::Duration::days(90);
        let q = u8::try_from(shifted.month0() / 3 + 1).unwrap_or(4);
        (shifted.year(), Self(q))
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// Inclusive date range `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Build a range.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, FmpError> {
        if from > to {
            return Err(FmpError::InvalidArg(format!(
                "date range start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Parse `YYYY-MM-DD` bounds.
    ///
    /// # Errors
    /// Returns `InvalidArg` for malformed dates or an inverted range.
    pub fn parse(from: &str, to: &str) -> Result<Self, FmpError> {
        let p = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| FmpError::InvalidArg(format!("invalid date '{s}': {e}")))
        };
        Self::new(p(from)?, p(to)?)
    }

    /// Range start.
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Range end.
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// `from`/`to` query values in `YYYY-MM-DD`.
    #[must_use]
    pub fn params(&self) -> (String, String) {
        (
            self.from.format("%Y-%m-%d").to_string(),
            self.to.format("%Y-%m-%d").to_string(),
        )
    }
}

/// Price bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceInterval {
    /// End-of-day bars.
    #[default]
    Daily,
    /// One-minute bars.
    Min1,
    /// Five-minute bars.
    Min5,
    /// Fifteen-minute bars.
    Min15,
    /// Thirty-minute bars.
    Min30,
    /// One-hour bars.
    Hour1,
    /// Four-hour bars.
    Hour4,
}

impl PriceInterval {
    /// Path segment for intraday charts; `None` for daily.
    #[must_use]
    pub const fn chart_segment(self) -> Option<&'static str> {
        match self {
            Self::Daily => None,
            Self::Min1 => Some("1min"),
            Self::Min5 => Some("5min"),
            Self::Min15 => Some("15min"),
            Self::Min30 => Some("30min"),
            Self::Hour1 => Some("1hour"),
            Self::Hour4 => Some("4hour"),
        }
    }

    /// Short code used in table names.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self.chart_segment() {
            Some(s) => s,
            None => "d",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_bounds() {
        assert!(Quarter::new(0).is_err());
        assert!(Quarter::new(5).is_err());
        let q = Quarter::new(2).unwrap();
        assert_eq!(
            q.end_date(2023).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 30).unwrap()
        );
    }

    #[test]
    fn last_reported_crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let (year, q) = Quarter::last_reported(today);
        assert_eq!(year, 2023);
        assert_eq!(q.get(), 4);
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(DateRange::parse("2024-02-01", "2024-01-01").is_err());
        let r = DateRange::parse("2024-01-01", "2024-02-01").unwrap();
        assert_eq!(r.params(), ("2024-01-01".into(), "2024-02-01".into()));
    }
}
