//! Extension bootstrap.
//!
//! Loading an extension is delegated to a `Bootstrap` implementation; this
//! module only fans the configured resources out, joins them, and remembers
//! the outcome so initialization runs once per `Api`.

use async_trait::async_trait;
use futures::future::try_join_all;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::error::{ApiError, BoxError};

/// Loads one extension resource.
#[async_trait]
pub trait Bootstrap: Send + Sync {
    async fn load(&self, resource: &str) -> Result<(), BoxError>;
}

/// Loader for configurations without extensions. Every load succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtensions;

#[async_trait]
impl Bootstrap for NoExtensions {
    async fn load(&self, _resource: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Load every resource concurrently; fails on the first resource that fails.
pub async fn initialize(loader: &dyn Bootstrap, resources: &[String]) -> Result<(), ApiError> {
    if resources.is_empty() {
        return Ok(());
    }
    let loads = resources.iter().map(|resource| async move {
        match loader.load(resource).await {
            Ok(()) => {
                info!(%resource, "extension loaded");
                Ok(())
            }
            Err(source) => {
                error!(%resource, error = %source, "extension failed to load");
                Err(ApiError::Bootstrap {
                    resource: resource.clone(),
                    source,
                })
            }
        }
    });
    try_join_all(loads).await.map(|_| ())
}

#[derive(Debug, Clone)]
struct LoadFailure {
    resource: String,
    message: String,
}

impl LoadFailure {
    fn from_error(err: &ApiError) -> Self {
        match err {
            ApiError::Bootstrap { resource, source } => Self {
                resource: resource.clone(),
                message: source.to_string(),
            },
            other => Self {
                resource: String::new(),
                message: other.to_string(),
            },
        }
    }

    fn to_error(&self) -> ApiError {
        ApiError::Bootstrap {
            resource: self.resource.clone(),
            source: self.message.clone().into(),
        }
    }
}

/// One-shot initialization gate.
///
/// The first caller runs the bootstrap; concurrent and later callers await
/// and share its outcome.
#[derive(Debug, Default)]
pub struct BootstrapGate {
    outcome: OnceCell<Result<(), LoadFailure>>,
}

impl BootstrapGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run(&self, loader: &dyn Bootstrap, resources: &[String]) -> Result<(), ApiError> {
        let outcome = self
            .outcome
            .get_or_init(|| async {
                initialize(loader, resources)
                    .await
                    .map_err(|err| LoadFailure::from_error(&err))
            })
            .await;
        outcome.as_ref().map_err(LoadFailure::to_error).copied()
    }

    /// Whether bootstrap has completed successfully.
    pub fn is_ready(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(())))
    }
}
