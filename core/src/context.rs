//! Shared state threaded through every pipeline stage.
//!
//! An `ApiContext` owns one configuration, one cache, one executor and the
//! bookkeeping for background refreshes. It is cheap to clone; clones share
//! the same state, and separate contexts are fully isolated.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::bootstrap::BootstrapGate;
use crate::cache::CacheStore;
use crate::config::ApiConfig;
use crate::executor::{CallExecutor, Transport};

#[derive(Clone, Debug)]
pub struct ApiContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: ApiConfig,
    cache: CacheStore,
    executor: CallExecutor,
    bootstrap: BootstrapGate,
    refreshes: Mutex<Vec<JoinHandle<()>>>,
}

impl ApiContext {
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                cache: CacheStore::new(),
                executor: CallExecutor::new(transport),
                bootstrap: BootstrapGate::new(),
                refreshes: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.inner.cache
    }

    pub fn executor(&self) -> &CallExecutor {
        &self.inner.executor
    }

    pub fn bootstrap(&self) -> &BootstrapGate {
        &self.inner.bootstrap
    }

    /// Name used to tag log lines.
    pub fn name(&self) -> &str {
        &self.inner.config.info.name
    }

    pub(crate) fn track_refresh(&self, handle: JoinHandle<()>) {
        let mut refreshes = self.inner.refreshes.lock();
        refreshes.retain(|h| !h.is_finished());
        refreshes.push(handle);
    }

    /// Wait for every background cache refresh started so far.
    pub async fn flush(&self) {
        loop {
            let pending = std::mem::take(&mut *self.inner.refreshes.lock());
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(err) = handle.await {
                    warn!(api = %self.name(), error = %err, "background refresh did not complete");
                }
            }
        }
    }
}
