//! The transport seam and the executor that drives it.
//!
//! # Design
//! This crate never opens a socket. A `Transport` implementation performs the
//! round-trip and reports non-2xx answers as `TransportError::Status`; the
//! executor forwards the outcome without inspecting it, retrying, or
//! branching on status codes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ApiError, TransportError};
use crate::http::HttpResponse;
use crate::normalize::NormalizedCall;

/// The HTTP client collaborator.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, call: &NormalizedCall) -> Result<HttpResponse, TransportError>;
}

/// Runs normalized calls against a shared transport.
#[derive(Clone)]
pub struct CallExecutor {
    transport: Arc<dyn Transport>,
}

impl CallExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn execute(&self, call: &NormalizedCall) -> Result<HttpResponse, ApiError> {
        debug!(method = %call.method, url = %call.url, "executing call");
        let response = self.transport.execute(call).await?;
        debug!(status = response.status, url = %call.url, "call completed");
        Ok(response)
    }
}

impl std::fmt::Debug for CallExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallExecutor").finish_non_exhaustive()
    }
}
