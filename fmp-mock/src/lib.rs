//! fmp-mock
//!
//! Test doubles for the fmp workspace:
//! - [`MockTransport`]: routes requests by resource to scripted behaviors,
//!   serves paged listings by the `page` parameter, and records every call.
//! - [`MemoryStore`]: a [`Persistence`](fmp_core::Persistence) that keeps
//!   written tables in memory.
//! - [`fixtures`]: deterministic provider-shaped payloads.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fmp_core::{ApiRequest, FmpError, PAGE_PARAM, Transport};
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub mod fixtures;
mod store;

pub use store::MemoryStore;

/// Symbol that makes any route containing it fail with a 500.
pub const FAIL_SYMBOL: &str = "FAIL";

/// Instruction for how one request (or one page) should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the payload immediately.
    Return(Value),
    /// Fail immediately with the error.
    Fail(FmpError),
    /// Sleep, then return the payload.
    Delay(Duration, Value),
    /// Never complete.
    Hang,
}

#[derive(Debug, Clone)]
enum Route {
    Single(MockBehavior),
    Paged(Vec<MockBehavior>),
}

#[derive(Default)]
struct InternalState {
    routes: HashMap<String, Route>,
    requests: Vec<ApiRequest>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Transport that serves scripted responses keyed by resource (`v3/quote/AAPL`).
///
/// Unknown resources fail with a 404 transport error. A paged route serves
/// page `n` from its `n`-th behavior and an empty array past the end.
#[derive(Default)]
pub struct MockTransport {
    state: Arc<Mutex<InternalState>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// Empty mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `payload` for every request to `resource`.
    pub async fn set_route(&self, resource: &str, payload: Value) {
        self.set_behavior(resource, MockBehavior::Return(payload))
            .await;
    }

    /// Apply `behavior` to every request to `resource`.
    pub async fn set_behavior(&self, resource: &str, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard
            .routes
            .insert(resource.to_string(), Route::Single(behavior));
    }

    /// Serve `pages[n]` for `page=n` on `resource`.
    pub async fn set_pages(&self, resource: &str, pages: Vec<Value>) {
        let mut guard = self.state.lock().await;
        guard.routes.insert(
            resource.to_string(),
            Route::Paged(pages.into_iter().map(MockBehavior::Return).collect()),
        );
    }

    /// Override the behavior of one page of a paged route, padding with empty
    /// pages as needed.
    pub async fn set_page_behavior(&self, resource: &str, page: u32, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        let route = guard
            .routes
            .entry(resource.to_string())
            .or_insert_with(|| Route::Paged(Vec::new()));
        if let Route::Single(_) = route {
            *route = Route::Paged(Vec::new());
        }
        if let Route::Paged(pages) = route {
            let idx = page as usize;
            if pages.len() <= idx {
                pages.resize(idx + 1, MockBehavior::Return(json!([])));
            }
            pages[idx] = behavior;
        }
    }

    /// Copy of every request received, in arrival order.
    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Number of requests received for `resource`.
    pub async fn calls_to(&self, resource: &str) -> usize {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.resource.to_string() == resource)
            .count()
    }

    /// Page indices requested on `resource`, in arrival order.
    pub async fn pages_requested(&self, resource: &str) -> Vec<u32> {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.resource.to_string() == resource)
            .filter_map(|r| r.query.get(PAGE_PARAM).and_then(|p| p.parse().ok()))
            .collect()
    }

    /// Highest number of requests observed in flight at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Forget recorded requests and the in-flight high-water mark.
    pub async fn clear_requests(&self) {
        self.state.lock().await.requests.clear();
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    fn forced_failure(req: &ApiRequest) -> Option<FmpError> {
        let hit = req
            .resource
            .path()
            .split(['/', ','])
            .chain(req.query.pairs().iter().map(|(_, v)| v.as_str()))
            .any(|part| part == FAIL_SYMBOL);
        hit.then(|| FmpError::transport(Some(500), format!("forced failure: {}", req.resource)))
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "fmp-mock"
    }

    async fn get_json(&self, req: &ApiRequest) -> Result<Value, FmpError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        // Snapshot the behavior without holding the lock across await points.
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            let key = req.resource.to_string();
            match guard.routes.get(&key) {
                Some(Route::Single(b)) => Some(b.clone()),
                Some(Route::Paged(pages)) => {
                    let page = req
                        .query
                        .get(PAGE_PARAM)
                        .and_then(|p| p.parse::<usize>().ok())
                        .unwrap_or(0);
                    Some(
                        pages
                            .get(page)
                            .cloned()
                            .unwrap_or(MockBehavior::Return(json!([]))),
                    )
                }
                None => None,
            }
        };

        if let Some(err) = Self::forced_failure(req) {
            return Err(err);
        }

        match behavior {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Delay(d, v)) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(FmpError::transport(
                Some(404),
                format!("no mock route for {}", req.resource),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmp_core::{Query, Resource};

    fn page(n: u32) -> ApiRequest {
        ApiRequest::new(Resource::v3("list"), Query::new().with(PAGE_PARAM, n))
    }

    #[tokio::test]
    async fn paged_route_serves_by_index_then_empty() {
        let m = MockTransport::new();
        m.set_pages("v3/list", vec![json!([{"a": 0}]), json!([{"a": 1}])])
            .await;
        assert_eq!(m.get_json(&page(1)).await.unwrap(), json!([{"a": 1}]));
        assert_eq!(m.get_json(&page(9)).await.unwrap(), json!([]));
        assert_eq!(m.pages_requested("v3/list").await, vec![1, 9]);
    }

    #[tokio::test]
    async fn page_override_pads_with_empty_pages() {
        let m = MockTransport::new();
        m.set_page_behavior("v3/list", 2, MockBehavior::Fail(FmpError::api("x")))
            .await;
        assert_eq!(m.get_json(&page(0)).await.unwrap(), json!([]));
        assert!(m.get_json(&page(2)).await.is_err());
    }

    #[tokio::test]
    async fn unknown_route_and_fail_symbol() {
        let m = MockTransport::new();
        m.set_route("v3/quote/FAIL", json!([])).await;
        let err = m
            .get_json(&ApiRequest::bare(Resource::v3("quote/FAIL")))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FmpError::transport(Some(500), "forced failure: v3/quote/FAIL")
        );
        let err = m
            .get_json(&ApiRequest::bare(Resource::v3("nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, FmpError::Transport { status: Some(404), .. }));
    }
}
