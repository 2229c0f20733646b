//! Fan a batch out through the dispatch pipeline and join the outcomes.
//!
//! # Design
//! Validation and method filtering happen synchronously in `invoke`, before
//! any future exists: an invalid batch is rejected outright and never touches
//! the transport. The returned future owns one descriptor per dispatch and
//! runs them concurrently once awaited. It resolves with every response in
//! submission order, or rejects with the first failure to surface. Skipped
//! descriptors take part in neither branch.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::context::ApiContext;
use crate::descriptor::{Batch, RequestDescriptor};
use crate::dispatch::dispatch;
use crate::error::{ApiError, SkipReason};
use crate::http::{HttpMethod, HttpResponse};

/// Responses of a settled batch, in submission order.
///
/// An entry is `None` when caching is enabled and nothing was cached yet.
pub type Responses = Vec<Option<HttpResponse>>;

/// Combined result of a batch still in flight.
pub type Pending = BoxFuture<'static, Result<Responses, ApiError>>;

type SuccessHandler = Box<dyn FnOnce(&[Option<HttpResponse>]) + Send>;
type ErrorHandler = Box<dyn FnOnce(&ApiError) + Send>;

/// Optional handlers fired once when a batch settles.
#[derive(Default)]
pub struct Callbacks {
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&[Option<HttpResponse>]) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&ApiError) + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Which descriptors an entry point accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFilter {
    /// Verb entry points: a descriptor may omit the method or repeat this one.
    Fixed(HttpMethod),
    /// The generic entry point: every descriptor must name its method.
    Explicit,
}

impl MethodFilter {
    /// The method a descriptor is dispatched with, or why it is skipped.
    pub fn admit(self, descriptor: &RequestDescriptor) -> Result<HttpMethod, SkipReason> {
        match (self, descriptor.method) {
            (MethodFilter::Fixed(expected), Some(found)) if found != expected => {
                Err(SkipReason::MethodMismatch {
                    expected: expected.as_str(),
                    found: found.to_string(),
                })
            }
            (MethodFilter::Fixed(expected), _) => Ok(expected),
            (MethodFilter::Explicit, Some(method)) => Ok(method),
            (MethodFilter::Explicit, None) => Err(SkipReason::MissingMethod),
        }
    }

    fn label(self) -> &'static str {
        match self {
            MethodFilter::Fixed(method) => method.as_str(),
            MethodFilter::Explicit => "CALL",
        }
    }
}

/// Validate, filter and dispatch a batch.
///
/// Returns `Err` synchronously when the batch is empty or any descriptor lacks
/// a url; nothing is dispatched in that case.
pub fn invoke(
    ctx: &ApiContext,
    batch: impl Into<Batch>,
    filter: MethodFilter,
    callbacks: Callbacks,
) -> Result<Pending, ApiError> {
    let batch_id = Uuid::new_v4();
    let descriptors = batch.into().validate().map_err(|err| {
        error!(api = %ctx.name(), entry = filter.label(), error = %err, "no valid requests passed, aborted");
        err
    })?;

    let admitted: Vec<RequestDescriptor> = descriptors
        .into_iter()
        .enumerate()
        .filter_map(|(index, mut descriptor)| match filter.admit(&descriptor) {
            Ok(method) => {
                descriptor.method = Some(method);
                Some(descriptor)
            }
            Err(reason) => {
                warn!(
                    api = %ctx.name(),
                    %batch_id,
                    index,
                    url = %descriptor.url,
                    %reason,
                    "request skipped"
                );
                None
            }
        })
        .collect();

    let span = info_span!("batch", api = %ctx.name(), %batch_id, entry = filter.label());
    let ctx = ctx.clone();

    Ok(async move {
        if admitted.is_empty() {
            warn!("no requests left to dispatch");
            return Ok(Vec::new());
        }

        match settle(ctx, admitted).await {
            Ok(responses) => {
                if let Some(on_success) = callbacks.on_success {
                    on_success(&responses);
                }
                Ok(responses)
            }
            Err(err) => {
                if let Some(on_error) = callbacks.on_error {
                    on_error(&err);
                }
                Err(err)
            }
        }
    }
    .instrument(span)
    .boxed())
}

/// Join every dispatch in submission order.
///
/// On a runtime each dispatch is its own task, so a failure that rejects the
/// batch early does not cancel its siblings: they run to completion and still
/// write the cache.
fn settle(ctx: ApiContext, admitted: Vec<RequestDescriptor>) -> Pending {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            let handles: Vec<_> = admitted
                .into_iter()
                .map(|descriptor| runtime.spawn(dispatch_owned(ctx.clone(), descriptor).in_current_span()))
                .collect();
            try_join_all(handles.into_iter().map(|handle| async move {
                match handle.await {
                    Ok(result) => result,
                    Err(err) => Err(ApiError::Aborted(err.to_string())),
                }
            }))
            .boxed()
        }
        Err(_) => try_join_all(
            admitted
                .into_iter()
                .map(|descriptor| dispatch_owned(ctx.clone(), descriptor)),
        )
        .boxed(),
    }
}

async fn dispatch_owned(ctx: ApiContext, descriptor: RequestDescriptor) -> Result<Option<HttpResponse>, ApiError> {
    dispatch(&ctx, descriptor).await
}
