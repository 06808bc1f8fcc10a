use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::FmpError;
use crate::request::ApiRequest;

/// Issues one authenticated GET against the provider and returns parsed JSON.
///
/// Implementations own the base URL and API key; callers only describe the
/// resource and its parameters. Errors are normalized to `FmpError::Transport`
/// (network failure or non-2xx) and `FmpError::Api` (provider error body).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Stable name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Perform the request and decode the body.
    async fn get_json(&self, req: &ApiRequest) -> Result<Value, FmpError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn get_json(&self, req: &ApiRequest) -> Result<Value, FmpError> {
        (**self).get_json(req).await
    }
}

impl dyn Transport {
    /// Build a transport from a closure; handy for tests and adapters.
    pub fn from_fn<F>(f: F) -> Arc<dyn Transport>
    where
        F: Send + Sync + 'static + Fn(&ApiRequest) -> Result<Value, FmpError>,
    {
        struct FnTransport<F>(F);

        #[async_trait]
        impl<F> Transport for FnTransport<F>
        where
            F: Send + Sync + 'static + Fn(&ApiRequest) -> Result<Value, FmpError>,
        {
            fn name(&self) -> &'static str {
                "fn-transport"
            }

            async fn get_json(&self, req: &ApiRequest) -> Result<Value, FmpError> {
                (self.0)(req)
            }
        }

        Arc::new(FnTransport(f))
    }
}
