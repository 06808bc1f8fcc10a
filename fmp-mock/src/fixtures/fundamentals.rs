use serde_json::{Value, json};

/// `periods` statement rows for `symbol`, newest first.
#[must_use]
pub fn income_statement(symbol: &str, periods: u32) -> Value {
    let rows: Vec<Value> = (0..periods)
        .map(|i| {
            let year = 2024 - i64::from(i);
            json!({
                "date": format!("{year}-09-28"),
                "symbol": symbol,
                "reportedCurrency": "USD",
                "calendarYear": year.to_string(),
                "period": "FY",
                "revenue": 1_000_000 + i64::from(i) * 1_000,
                "netIncome": 250_000.5 - f64::from(i),
            })
        })
        .collect();
    Value::Array(rows)
}

/// One-element profile array, as `profile/{symbol}` returns it.
#[must_use]
pub fn profile(symbol: &str) -> Value {
    let (name, sector) = if symbol == "AAPL" {
        ("Apple Inc.", "Technology")
    } else {
        ("Generic Corp", "Industrials")
    };
    json!([{
        "symbol": symbol,
        "companyName": name,
        "currency": "USD",
        "sector": sector,
        "isActivelyTrading": true,
    }])
}
