//! Ordered, uniformly-keyed records shaped from provider JSON payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FmpError;

/// One row: field name to JSON value, in provider key order.
pub type Record = Map<String, Value>;

/// Key under which the provider reports request-level errors.
const ERROR_KEY: &str = "Error Message";

/// Tabular result: an ordered sequence of records sharing one column set.
///
/// Columns are the union of record keys in first-seen order. A record that
/// lacks a column reads as null for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build from records, deriving the column order.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut table = Self::new();
        for r in records {
            table.push(r);
        }
        table
    }

    /// Shape a decoded payload into a table.
    ///
    /// - array of objects: one row each; array of scalars: rows `{"value": v}`
    /// - object with a `historical` array: its rows, with `symbol` injected
    /// - object with `historicalStockList`: each entry flattened as above
    /// - null, `{}`, `[]`: empty table
    /// - any other object: a single row
    ///
    /// # Errors
    /// Returns `Api` when the payload carries the provider's `"Error Message"`.
    pub fn from_payload(payload: Value) -> Result<Self, FmpError> {
        Ok(Self::from_records(records_from_payload(payload)?))
    }

    /// Append a record, extending the column set with unseen keys.
    pub fn push(&mut self, record: Record) {
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(record);
    }

    /// Append every row of `other`, preserving order.
    pub fn extend(&mut self, other: Self) {
        for r in other.rows {
            self.push(r);
        }
    }

    /// Concatenate tables in order.
    #[must_use]
    pub fn concat(tables: impl IntoIterator<Item = Self>) -> Self {
        let mut out = Self::new();
        for t in tables {
            out.extend(t);
        }
        out
    }

    /// Set `column` to `value` on every row that does not already carry it.
    #[must_use]
    pub fn with_column(mut self, column: &str, value: &Value) -> Self {
        for r in &mut self.rows {
            if !r.contains_key(column) {
                r.insert(column.to_string(), value.clone());
            }
        }
        if !self.rows.is_empty() && !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        self
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Consume into rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, `None` where a row lacks it.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows.iter().map(move |r| r.get(name))
    }

    /// Convert to a polars `DataFrame`.
    ///
    /// Columns whose non-null values are all booleans become boolean columns,
    /// all-numeric columns become `f64`, everything else becomes strings
    /// (nested values as JSON text).
    ///
    /// # Errors
    /// Returns `Data` if polars rejects the assembled columns.
    #[cfg(feature = "dataframe")]
    pub fn to_dataframe(&self) -> Result<polars::prelude::DataFrame, FmpError> {
        use polars::prelude::{Column, DataFrame};

        let mut cols: Vec<Column> = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let values: Vec<Option<&Value>> =
                self.column(name).map(|v| v.filter(|v| !v.is_null())).collect();
            let present = || values.iter().flatten();
            let col = if present().all(|v| v.is_boolean()) && present().next().is_some() {
                let data: Vec<Option<bool>> =
                    values.iter().map(|v| v.and_then(Value::as_bool)).collect();
                Column::new(name.as_str().into(), data)
            } else if present().all(|v| v.is_number()) && present().next().is_some() {
                let data: Vec<Option<f64>> =
                    values.iter().map(|v| v.and_then(Value::as_f64)).collect();
                Column::new(name.as_str().into(), data)
            } else {
                let data: Vec<Option<String>> =
                    values.iter().map(|v| v.map(value_to_text)).collect();
                Column::new(name.as_str().into(), data)
            };
            cols.push(col);
        }
        DataFrame::new(cols).map_err(|e| FmpError::Data(e.to_string()))
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut t = Self::new();
        for r in iter {
            t.push(r);
        }
        t
    }
}

/// Render a value as text: strings verbatim, everything else as JSON.
#[must_use]
pub fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract the records carried by one decoded payload.
///
/// An empty result means "no data", which pagination treats as end-of-data.
///
/// # Errors
/// Returns `Api` when the payload carries the provider's `"Error Message"`.
pub fn records_from_payload(payload: Value) -> Result<Vec<Record>, FmpError> {
    match payload {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.into_iter().map(item_to_record).collect()),
        Value::Object(mut obj) => {
            if let Some(msg) = obj.get(ERROR_KEY) {
                return Err(FmpError::api(value_to_text(msg)));
            }
            if let Some(Value::Array(list)) = obj.remove("historicalStockList") {
                let mut out = Vec::new();
                for entry in list {
                    if let Value::Object(entry) = entry {
                        out.extend(historical_rows(entry));
                    }
                }
                return Ok(out);
            }
            if matches!(obj.get("historical"), Some(Value::Array(_))) {
                return Ok(historical_rows(obj));
            }
            if obj.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![obj])
        }
        scalar => Ok(vec![item_to_record(scalar)]),
    }
}

fn item_to_record(item: Value) -> Record {
    match item {
        Value::Object(obj) => obj,
        other => {
            let mut r = Record::new();
            r.insert("value".into(), other);
            r
        }
    }
}

fn historical_rows(mut obj: Record) -> Vec<Record> {
    let symbol = obj.remove("symbol");
    let Some(Value::Array(rows)) = obj.remove("historical") else {
        return Vec::new();
    };
    rows.into_iter()
        .map(|row| {
            let mut r = Record::new();
            if let Some(sym) = &symbol {
                r.insert("symbol".into(), sym.clone());
            }
            for (k, v) in item_to_record(row) {
                r.insert(k, v);
            }
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_objects_keeps_first_seen_column_order() {
        let t = Table::from_payload(json!([
            {"symbol": "AAPL", "price": 1.0},
            {"symbol": "MSFT", "price": 2.0, "volume": 10}
        ]))
        .unwrap();
        assert_eq!(t.columns(), ["symbol", "price", "volume"]);
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.column("volume").collect::<Vec<_>>(),
            vec![None, Some(&json!(10))]
        );
    }

    #[test]
    fn historical_object_injects_symbol() {
        let t = Table::from_payload(json!({
            "symbol": "AAPL",
            "historical": [{"date": "2024-01-02", "close": 1.5}]
        }))
        .unwrap();
        assert_eq!(t.columns(), ["symbol", "date", "close"]);
        assert_eq!(t.rows()[0]["symbol"], json!("AAPL"));
    }

    #[test]
    fn historical_stock_list_flattens() {
        let t = Table::from_payload(json!({
            "historicalStockList": [
                {"symbol": "EURUSD", "historical": [{"date": "d1"}, {"date": "d2"}]},
                {"symbol": "GBPUSD", "historical": [{"date": "d1"}]}
            ]
        }))
        .unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows()[2]["symbol"], json!("GBPUSD"));
    }

    #[test]
    fn empty_shapes_are_empty_tables() {
        for p in [json!(null), json!([]), json!({})] {
            assert!(Table::from_payload(p).unwrap().is_empty());
        }
    }

    #[test]
    fn scalar_list_becomes_value_column() {
        let t = Table::from_payload(json!(["AAPL", "MSFT"])).unwrap();
        assert_eq!(t.columns(), ["value"]);
        assert_eq!(t.rows()[1]["value"], json!("MSFT"));
    }

    #[test]
    fn error_message_maps_to_api_error() {
        let err = Table::from_payload(json!({"Error Message": "Invalid API KEY."})).unwrap_err();
        assert_eq!(err, FmpError::api("Invalid API KEY."));
    }

    #[test]
    fn with_column_only_fills_missing() {
        let t = Table::from_payload(json!([{"name": "a"}, {"name": "b", "tag": "x"}]))
            .unwrap()
            .with_column("tag", &json!("default"));
        let tags: Vec<_> = t.column("tag").collect();
        assert_eq!(tags, vec![Some(&json!("default")), Some(&json!("x"))]);
    }

    #[test]
    fn concat_preserves_order() {
        let a = Table::from_payload(json!([{"i": 0}, {"i": 1}])).unwrap();
        let b = Table::from_payload(json!([{"i": 2}])).unwrap();
        let all = Table::concat([a, b]);
        let idx: Vec<_> = all.column("i").map(|v| v.cloned()).collect();
        assert_eq!(idx, vec![Some(json!(0)), Some(json!(1)), Some(json!(2))]);
    }
}
