//! Public entry points: one per HTTP verb plus a generic `call`.
//!
//! # Design
//! `Api` is a thin handle over an `ApiContext`. Every entry point validates
//! its batch synchronously and hands back a `Pending` future; an `Err` from
//! the entry point itself means nothing was dispatched. Verb entry points
//! stamp their method onto descriptors that omit one and skip descriptors
//! that name another; `call` requires every descriptor to name its method.

use std::sync::Arc;

use serde_json::Value;

use crate::aggregate::{invoke, Callbacks, MethodFilter, Pending};
use crate::bootstrap::Bootstrap;
use crate::cache::CacheStore;
use crate::config::ApiConfig;
use crate::context::ApiContext;
use crate::descriptor::{Batch, RequestDescriptor};
use crate::error::{ApiError, ValidationError};
use crate::executor::Transport;
use crate::http::HttpMethod;
use crate::template::resolve;
use crate::types::Params;

/// Request orchestration client.
#[derive(Debug, Clone)]
pub struct Api {
    ctx: ApiContext,
}

impl Api {
    pub fn new<T: Transport + 'static>(config: ApiConfig, transport: T) -> Self {
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            ctx: ApiContext::new(config, transport),
        }
    }

    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    pub fn config(&self) -> &ApiConfig {
        self.ctx.config()
    }

    pub fn cache(&self) -> &CacheStore {
        self.ctx.cache()
    }

    /// Load the configured extensions. Runs once; later calls share the
    /// first outcome. Callers should await this before dispatching.
    pub async fn init(&self, loader: &dyn Bootstrap) -> Result<(), ApiError> {
        self.ctx.bootstrap().run(loader, &self.config().ext).await
    }

    pub fn is_initialized(&self) -> bool {
        self.ctx.bootstrap().is_ready()
    }

    /// Wait for background cache refreshes to finish.
    pub async fn flush(&self) {
        self.ctx.flush().await
    }

    /// Build a descriptor with path placeholders already resolved. Only the
    /// leftover params are kept on the descriptor. The api prefix is left to
    /// normalization, which applies it exactly once.
    pub fn request(&self, url: &str, params: Params, body: Option<Value>) -> Result<RequestDescriptor, ApiError> {
        if url.is_empty() {
            return Err(ValidationError::MissingUrl { index: 0 }.into());
        }
        let resolved = resolve(url, &params);
        Ok(RequestDescriptor {
            url: resolved.url,
            params: resolved.remaining,
            body,
            ..RequestDescriptor::default()
        })
    }

    pub fn get(&self, batch: impl Into<Batch>, callbacks: Callbacks) -> Result<Pending, ApiError> {
        invoke(&self.ctx, batch, MethodFilter::Fixed(HttpMethod::Get), callbacks)
    }

    pub fn post(&self, batch: impl Into<Batch>, callbacks: Callbacks) -> Result<Pending, ApiError> {
        invoke(&self.ctx, batch, MethodFilter::Fixed(HttpMethod::Post), callbacks)
    }

    pub fn put(&self, batch: impl Into<Batch>, callbacks: Callbacks) -> Result<Pending, ApiError> {
        invoke(&self.ctx, batch, MethodFilter::Fixed(HttpMethod::Put), callbacks)
    }

    pub fn delete(&self, batch: impl Into<Batch>, callbacks: Callbacks) -> Result<Pending, ApiError> {
        invoke(&self.ctx, batch, MethodFilter::Fixed(HttpMethod::Delete), callbacks)
    }

    /// Dispatch descriptors that each name their own method.
    pub fn call(&self, batch: impl Into<Batch>, callbacks: Callbacks) -> Result<Pending, ApiError> {
        invoke(&self.ctx, batch, MethodFilter::Explicit, callbacks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpResponse;
    use crate::normalize::NormalizedCall;
    use crate::types::ParamValue;
    use async_trait::async_trait;
    use serde_json::json;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _call: &NormalizedCall) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
    }

    fn api() -> Api {
        let config = ApiConfig::default()
            .merge(json!({ "paths": { "api": "https://api.test" } }))
            .unwrap();
        Api::new(config, Unreachable)
    }

    fn params(pairs: &[(&str, ParamValue)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn request_builder_resolves_placeholders() {
        let d = api()
            .request(
                "/users/{{id}}",
                params(&[("id", 5.into()), ("verbose", true.into())]),
                Some(json!({"a": 1})),
            )
            .unwrap();
        assert_eq!(d.url, "/users/5");
        assert_eq!(d.params, params(&[("verbose", true.into())]));
        assert_eq!(d.body, Some(json!({"a": 1})));
        assert!(d.method.is_none());
    }

    #[test]
    fn request_builder_keeps_absolute_urls() {
        let d = api().request("http://other.test/x", Params::new(), None).unwrap();
        assert_eq!(d.url, "http://other.test/x");
    }

    #[test]
    fn request_builder_output_is_prefixed_once() {
        let api = api();
        let d = api
            .request("/users/{{id}}", params(&[("id", 5.into())]), None)
            .unwrap();
        let call = crate::normalize::normalize(&d, api.config()).unwrap();
        assert_eq!(call.url, "https://api.test/users/5");
    }

    #[test]
    fn request_builder_rejects_empty_url() {
        assert!(matches!(
            api().request("", Params::new(), None),
            Err(ApiError::Validation(ValidationError::MissingUrl { .. }))
        ));
    }

    #[test]
    fn entry_points_reject_invalid_batches_synchronously() {
        let api = api();
        assert!(matches!(
            api.get(Vec::<RequestDescriptor>::new(), Callbacks::new()),
            Err(ApiError::Validation(ValidationError::EmptyBatch))
        ));
        assert!(api.post(RequestDescriptor::default(), Callbacks::new()).is_err());
        assert!(api.call([RequestDescriptor::new("")], Callbacks::new()).is_err());
    }

    #[tokio::test]
    async fn init_without_extensions_succeeds() {
        let api = api();
        assert!(!api.is_initialized());
        api.init(&crate::bootstrap::NoExtensions).await.unwrap();
        assert!(api.is_initialized());
    }
}
