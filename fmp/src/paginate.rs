//! Concurrent collection of paginated listings.
//!
//! Pages are fetched in batches of `limit` consecutive indices. Each batch is
//! awaited in full before the next one is issued. The first empty page ends
//! pagination; pages after it are discarded even when non-empty, so the result
//! is always the contiguous prefix a one-page-at-a-time walk would produce.

use fmp_core::{
    FmpError, PageRequest, PageResult, Query, Record, Resource, Transport, records_from_payload,
};
use futures::future::join_all;

/// Fetch one page and extract its records.
///
/// # Errors
/// Returns the transport error, or `Api` when the body carries a provider
/// error message. The page index is not attached here.
pub async fn fetch_page(
    transport: &dyn Transport,
    req: &PageRequest,
) -> Result<PageResult, FmpError> {
    let payload = transport.get_json(&req.to_api_request()).await?;
    Ok(PageResult {
        page: req.page,
        records: records_from_payload(payload)?,
    })
}

/// Collect every page of `resource` using batches of `limit` concurrent fetches.
///
/// Records come back in ascending page order regardless of completion order.
///
/// # Errors
/// - `InvalidArg` when `limit` is zero.
/// - `Fetch { page, .. }` for the lowest-indexed failing page that precedes the
///   first empty page. Every sibling in its batch has completed by then.
/// - `PageLimitExceeded` when `max_pages` pages were all non-empty.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "fmp::paginate::collect_pages",
        skip(transport, query),
        fields(resource = %resource),
        err,
    )
)]
pub async fn collect_pages(
    transport: &dyn Transport,
    resource: &Resource,
    query: &Query,
    limit: usize,
    max_pages: Option<u32>,
) -> Result<Vec<Record>, FmpError> {
    if limit == 0 {
        return Err(FmpError::InvalidArg(
            "page concurrency must be positive".into(),
        ));
    }
    let step = u32::try_from(limit).unwrap_or(u32::MAX);
    let mut records = Vec::new();
    let mut start: u32 = 0;

    loop {
        let mut end = start.saturating_add(step);
        if let Some(max) = max_pages {
            if start >= max {
                return Err(FmpError::PageLimitExceeded { max_pages: max });
            }
            end = end.min(max);
        }

        let requests: Vec<PageRequest> = (start..end)
            .map(|page| PageRequest::new(resource.clone(), page, query.clone()))
            .collect();
        let results = join_all(requests.iter().map(|req| fetch_page(transport, req))).await;

        for (req, result) in requests.iter().zip(results) {
            let page = result.map_err(|e| FmpError::fetch(req.page, e))?;
            if page.is_end() {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    end_page = page.page,
                    records = records.len(),
                    "pagination ended"
                );
                return Ok(records);
            }
            records.extend(page.records);
        }

        if end == u32::MAX {
            return Err(FmpError::PageLimitExceeded { max_pages: end });
        }
        start = end;
    }
}
