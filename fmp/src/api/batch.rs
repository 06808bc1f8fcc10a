//! Per-identifier fan-out that tolerates partial failure.

use std::future::Future;

use fmp_core::{BatchReport, FmpError, IntoSymbols, Table};
use futures::{StreamExt, stream};

use crate::Fmp;

impl Fmp {
    /// Run `op` for every identifier with at most `batch_concurrency` in
    /// flight.
    ///
    /// Unlike the entity handles, a failing identifier does not abort the
    /// batch: its error is recorded in [`BatchReport::warnings`] and the
    /// remaining identifiers still run. Both vectors keep input order.
    ///
    /// ```rust,ignore
    /// let report = fmp
    ///     .batch("AAPL,MSFT,XYZ", |fmp, sym| async move {
    ///         fmp.ticker(sym)?.profile().await
    ///     })
    ///     .await?;
    /// for (sym, err) in &report.warnings {
    ///     eprintln!("{sym}: {err}");
    /// }
    /// ```
    ///
    /// # Errors
    /// Only `InvalidArg` when the identifiers normalize to nothing.
    pub async fn batch<'a, F, Fut>(
        &'a self,
        ids: impl IntoSymbols,
        op: F,
    ) -> Result<BatchReport, FmpError>
    where
        F: Fn(&'a Self, String) -> Fut,
        Fut: Future<Output = Result<Table, FmpError>> + 'a,
    {
        let symbols = ids.into_symbols()?;
        let results: Vec<(String, Result<Table, FmpError>)> =
            stream::iter(symbols.into_vec().into_iter().map(|sym| {
                let fut = op(self, sym.clone());
                async move { (sym, fut.await) }
            }))
            .buffered(self.cfg.batch_concurrency)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (sym, result) in results {
            match result {
                Ok(table) => report.tables.push((sym, table)),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(symbol = %sym, error = %e, "batch item failed");
                    report.warnings.push((sym, e));
                }
            }
        }
        Ok(report)
    }
}
