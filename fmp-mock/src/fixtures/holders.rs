use serde_json::{Value, json};

/// One holder row identifying its page and position.
#[must_use]
pub fn holder_record(symbol: &str, page: u32, row: u32) -> Value {
    json!({
        "symbol": symbol,
        "investorName": format!("HOLDER {page}-{row}"),
        "page": page,
        "row": row,
        "weight": f64::from(row) / 100.0,
    })
}

/// `pages` non-empty pages of `per_page` holder rows each.
///
/// Concatenated in page order, rows are sorted by `(page, row)`.
#[must_use]
pub fn holder_pages(symbol: &str, pages: u32, per_page: u32) -> Vec<Value> {
    (0..pages)
        .map(|p| Value::Array((0..per_page).map(|r| holder_record(symbol, p, r)).collect()))
        .collect()
}
