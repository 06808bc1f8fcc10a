use async_trait::async_trait;

use crate::{FmpError, Table};

/// Writes a tabular result to a local store under a table name.
///
/// Whether a write replaces or appends is up to the implementation.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Stable name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Store `table` under `table_name`.
    async fn write_table(&self, table_name: &str, table: &Table) -> Result<(), FmpError>;
}

/// Deterministic table name for an operation on a set of identifiers.
///
/// Identifiers, the operation, then each qualifier are joined with `_`; any
/// character outside `[A-Za-z0-9_]` becomes `_`. Empty qualifiers are skipped.
///
/// ```
/// # use fmp_core::table_name;
/// assert_eq!(table_name(["AAPL", "MSFT"], "income", ["Q"]), "AAPL_MSFT_income_Q");
/// assert_eq!(table_name(["^GSPC"], "price", ["2024-01-01"]), "_GSPC_price_2024_01_01");
/// ```
pub fn table_name<I, S, Q, T>(identifiers: I, operation: &str, qualifiers: Q) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    Q: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut parts: Vec<String> = identifiers
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect();
    parts.push(operation.to_string());
    parts.extend(
        qualifiers
            .into_iter()
            .map(|q| q.as_ref().to_string())
            .filter(|q| !q.is_empty()),
    );
    parts
        .join("_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_stable_and_sanitized() {
        let a = table_name(["BRK.B"], "profile", Vec::<String>::new());
        let b = table_name(["BRK.B"], "profile", Vec::<String>::new());
        assert_eq!(a, b);
        assert_eq!(a, "BRK_B_profile");
    }

    #[test]
    fn empty_qualifiers_are_skipped() {
        assert_eq!(table_name(["X"], "news", ["", "2024"]), "X_news_2024");
    }
}
