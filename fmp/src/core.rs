use std::future::Future;
use std::sync::Arc;

use fmp_core::{
    ApiRequest, FmpConfig, FmpError, Persistence, Query, Record, Resource, RetryConfig, Symbols,
    Table, Transport,
};
use fmp_middleware::RetryTransport;
use futures::{StreamExt, TryStreamExt, stream};

use crate::paginate::collect_pages;

/// Client for the Financial Modeling Prep API.
///
/// Holds one shared [`Transport`] and an optional [`Persistence`] store; all
/// entity handles borrow from it. There is no other state.
pub struct Fmp {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) store: Option<Arc<dyn Persistence>>,
    pub(crate) cfg: FmpConfig,
}

impl std::fmt::Debug for Fmp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fmp")
            .field("transport", &self.transport.name())
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .field("page_concurrency", &self.cfg.page_concurrency)
            .field("batch_concurrency", &self.cfg.batch_concurrency)
            .field("max_pages", &self.cfg.max_pages)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Fmp`].
pub struct FmpBuilder {
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn Persistence>>,
    cfg: FmpConfig,
}

impl Default for FmpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FmpBuilder {
    /// Builder with default limits and no transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: None,
            store: None,
            cfg: FmpConfig::default(),
        }
    }

    /// Start from an existing configuration (limits, retry policy).
    #[must_use]
    pub fn from_config(cfg: FmpConfig) -> Self {
        Self {
            transport: None,
            store: None,
            cfg,
        }
    }

    /// Transport every request goes through.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Store used when an operation is asked to persist its table.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn Persistence>) -> Self {
        self.store = Some(store);
        self
    }

    /// Concurrent page fetches per pagination batch.
    #[must_use]
    pub const fn page_concurrency(mut self, limit: usize) -> Self {
        self.cfg.page_concurrency = limit;
        self
    }

    /// Concurrent per-identifier operations.
    #[must_use]
    pub const fn batch_concurrency(mut self, limit: usize) -> Self {
        self.cfg.batch_concurrency = limit;
        self
    }

    /// Fail paginated collections that have not ended after `max` pages.
    #[must_use]
    pub const fn max_pages(mut self, max: Option<u32>) -> Self {
        self.cfg.max_pages = max;
        self
    }

    /// Retry transient transport failures with backoff.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.cfg.retry = Some(retry);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `Config` when no transport was set or a limit is zero.
    pub fn build(self) -> Result<Fmp, FmpError> {
        let transport = self
            .transport
            .ok_or_else(|| FmpError::Config("no transport configured".into()))?;
        if self.cfg.page_concurrency == 0 || self.cfg.batch_concurrency == 0 {
            return Err(FmpError::Config(
                "concurrency limits must be positive".into(),
            ));
        }
        if self.cfg.max_pages == Some(0) {
            return Err(FmpError::Config("max_pages must be positive".into()));
        }
        let transport = match self.cfg.retry {
            Some(retry) if retry.max_attempts == 0 => {
                return Err(FmpError::Config(
                    "retry.max_attempts must be at least 1".into(),
                ));
            }
            Some(retry) if retry.max_attempts > 1 => {
                Arc::new(RetryTransport::new(transport, retry)) as Arc<dyn Transport>
            }
            _ => transport,
        };
        Ok(Fmp {
            transport,
            store: self.store,
            cfg: self.cfg,
        })
    }
}

impl Fmp {
    /// Start building a client.
    #[must_use]
    pub fn builder() -> FmpBuilder {
        FmpBuilder::new()
    }

    /// Client over HTTP from `cfg`; opens the SQLite store when
    /// `cfg.database_path` is set.
    ///
    /// # Errors
    /// Returns `Config` for invalid configuration and `Persistence` if the
    /// database cannot be opened.
    #[cfg(feature = "http")]
    pub async fn connect(cfg: FmpConfig) -> Result<Self, FmpError> {
        cfg.validate()?;
        let transport: Arc<dyn Transport> = Arc::new(fmp_http::HttpTransport::from_config(&cfg)?);
        let mut builder = FmpBuilder::from_config(cfg.clone()).transport(transport);
        if let Some(path) = &cfg.database_path {
            builder = builder.store(open_store(path).await?);
        }
        builder.build()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &FmpConfig {
        &self.cfg
    }

    /// Shared transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Configured store, if any.
    #[must_use]
    pub fn store(&self) -> Option<&Arc<dyn Persistence>> {
        self.store.as_ref()
    }

    /// One request shaped into a table. An empty payload is an empty table.
    ///
    /// # Errors
    /// Propagates transport and provider errors.
    pub async fn fetch_table(&self, req: ApiRequest) -> Result<Table, FmpError> {
        let payload = self.transport.get_json(&req).await?;
        Table::from_payload(payload)
    }

    /// Every page of a paginated listing, using the configured page
    /// concurrency and page budget.
    ///
    /// # Errors
    /// See [`collect_pages`](crate::collect_pages).
    pub async fn collect(&self, resource: &Resource, query: &Query) -> Result<Table, FmpError> {
        let records: Vec<Record> = collect_pages(
            self.transport.as_ref(),
            resource,
            query,
            self.cfg.page_concurrency,
            self.cfg.max_pages,
        )
        .await?;
        Ok(Table::from_records(records))
    }

    /// Run `op` once per symbol with at most `batch_concurrency` in flight,
    /// concatenating tables in symbol order. The first failure in symbol
    /// order is returned and outstanding calls are dropped.
    pub(crate) async fn per_symbol<F, Fut>(&self, symbols: &Symbols, op: F) -> Result<Table, FmpError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Table, FmpError>>,
    {
        let tables: Vec<Table> = stream::iter(symbols.iter().cloned().map(op))
            .buffered(self.cfg.batch_concurrency)
            .try_collect()
            .await?;
        Ok(Table::concat(tables))
    }

    /// Hand `table` to the store when `persist` is set.
    ///
    /// Without a store the request is logged and skipped; empty tables are
    /// never written.
    pub(crate) async fn finish(
        &self,
        persist: bool,
        table_name: String,
        table: Table,
    ) -> Result<Table, FmpError> {
        if !persist {
            return Ok(table);
        }
        let Some(store) = &self.store else {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                table = %table_name,
                "persistence requested but no store is configured"
            );
            return Ok(table);
        };
        if table.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(table = %table_name, "empty table not persisted");
            return Ok(table);
        }
        store.write_table(&table_name, &table).await?;
        Ok(table)
    }
}

#[cfg(all(feature = "http", feature = "sqlite"))]
async fn open_store(path: &std::path::Path) -> Result<Arc<dyn Persistence>, FmpError> {
    Ok(Arc::new(fmp_sqlite::SqliteStore::connect(path).await?))
}

#[cfg(all(feature = "http", not(feature = "sqlite")))]
async fn open_store(path: &std::path::Path) -> Result<Arc<dyn Persistence>, FmpError> {
    Err(FmpError::Config(format!(
        "database_path {} set but the `sqlite` feature is disabled",
        path.display()
    )))
}
