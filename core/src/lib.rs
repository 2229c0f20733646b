//! Client-side request orchestration.
//!
//! # Overview
//! Normalizes heterogeneous request descriptors into uniform transport calls,
//! caches responses by a fingerprint of url and parameters, and joins a batch
//! of concurrent calls into one combined result. The HTTP round-trip itself
//! is delegated to a caller-supplied `Transport`.
//!
//! # Design
//! - `Api` exposes `get`/`post`/`put`/`delete`/`call`; each validates its batch
//!   up front and returns a future for the combined result.
//! - All state (configuration, cache, executor, bootstrap gate) lives in an
//!   `ApiContext`, so separate instances never share a cache.
//! - Descriptors are consumed by value and never mutated behind the caller's
//!   back; normalization builds a fresh `NormalizedCall`.
//! - With caching enabled a dispatch returns the cached value immediately and
//!   refreshes the cache in the background.

pub mod aggregate;
pub mod bootstrap;
pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod fingerprint;
pub mod http;
pub mod normalize;
pub mod template;
pub mod types;

pub use aggregate::{Callbacks, MethodFilter, Pending, Responses};
pub use bootstrap::{Bootstrap, NoExtensions};
pub use cache::CacheStore;
pub use client::Api;
pub use config::{ApiConfig, BodyParser};
pub use context::ApiContext;
pub use descriptor::{Batch, RequestDescriptor};
pub use error::{ApiError, BoxError, SkipReason, TransportError, ValidationError};
pub use executor::Transport;
pub use fingerprint::{fingerprint, CacheKey};
pub use http::{HttpMethod, HttpResponse};
pub use normalize::NormalizedCall;
pub use types::{MediaChoice, ParamValue, Params};
