//! normalize → cache check → execute → cache write, for one descriptor.
//!
//! With caching enabled the caller gets whatever is cached for the
//! fingerprint right now (possibly nothing) and the real call refreshes the
//! cache in the background; only a later dispatch sees the fresh value. With
//! caching disabled the call is awaited and its response returned, and the
//! cache is still written on success.

use tracing::{debug, warn};

use crate::context::ApiContext;
use crate::descriptor::RequestDescriptor;
use crate::error::ApiError;
use crate::fingerprint::CacheKey;
use crate::http::HttpResponse;
use crate::normalize::{normalize, NormalizedCall};

/// Dispatch one descriptor.
///
/// Returns `Ok(None)` only in cache-enabled mode when nothing was cached yet.
/// Background refreshes are spawned on the current tokio runtime; outside a
/// runtime the refresh is awaited before returning the (already read) value.
pub async fn dispatch(ctx: &ApiContext, descriptor: RequestDescriptor) -> Result<Option<HttpResponse>, ApiError> {
    let key = descriptor.fingerprint();
    let call = normalize(&descriptor, ctx.config())?;

    if !ctx.config().settings.cache.enabled {
        let response = ctx.executor().execute(&call).await?;
        store(ctx, key, &response);
        return Ok(Some(response));
    }

    let cached = ctx.cache().get(&key);
    debug!(api = %ctx.name(), %key, hit = cached.is_some(), "cache lookup");

    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            let handle = runtime.spawn(refresh(ctx.clone(), key, call));
            ctx.track_refresh(handle);
        }
        Err(_) => refresh(ctx.clone(), key, call).await,
    }

    Ok(cached)
}

async fn refresh(ctx: ApiContext, key: CacheKey, call: NormalizedCall) {
    match ctx.executor().execute(&call).await {
        Ok(response) => store(&ctx, key, &response),
        Err(err) => warn!(api = %ctx.name(), url = %call.url, error = %err, "background refresh failed"),
    }
}

fn store(ctx: &ApiContext, key: CacheKey, response: &HttpResponse) {
    debug!(api = %ctx.name(), %key, "saving call in cache");
    ctx.cache().set(key, response.clone());
}
