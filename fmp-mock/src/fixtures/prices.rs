use serde_json::{Value, json};

/// `historical-price-full` body with `days` bars, newest first.
#[must_use]
pub fn historical_daily(symbol: &str, days: u32) -> Value {
    let bars: Vec<Value> = (0..days)
        .map(|d| {
            json!({
                "date": format!("2024-01-{:02}", 31 - d.min(30)),
                "open": 100.0 + f64::from(d),
                "close": 101.0 + f64::from(d),
                "volume": 1_000 * (i64::from(d) + 1),
            })
        })
        .collect();
    json!({ "symbol": symbol, "historical": bars })
}

/// One-element quote array.
#[must_use]
pub fn quote(symbol: &str, price: f64) -> Value {
    json!([{ "symbol": symbol, "price": price, "volume": 12_345 }])
}

/// `points` observations of an economic series.
#[must_use]
pub fn economic_series(points: u32) -> Value {
    Value::Array(
        (0..points)
            .map(|i| json!({ "date": format!("2023-{:02}-01", 12 - i.min(11)), "value": 3.0 + f64::from(i) / 10.0 }))
            .collect(),
    )
}
