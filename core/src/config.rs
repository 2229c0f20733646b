//! Configuration for an `Api` instance.
//!
//! # Design
//! The configuration is a plain serde value so partial overrides can be
//! supplied as JSON and deep-merged onto the defaults: objects merge key by
//! key, every other value replaces what was there. The body parser is a
//! capability rather than data, so it is set in code and skipped by serde.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpMethod;

/// Turns a structured request body into the transport payload.
pub type BodyParserFn = dyn Fn(&Value) -> Result<String, ApiError> + Send + Sync;

/// Shared handle to a body parser. Defaults to compact JSON serialization.
#[derive(Clone)]
pub struct BodyParser(Arc<BodyParserFn>);

impl BodyParser {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<String, ApiError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn parse(&self, body: &Value) -> Result<String, ApiError> {
        (self.0)(body)
    }
}

impl Default for BodyParser {
    fn default() -> Self {
        Self::new(|body| serde_json::to_string(body).map_err(|e| ApiError::BodyParser(e.to_string())))
    }
}

impl fmt::Debug for BodyParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyParser(..)")
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub paths: Paths,
    pub info: Info,
    /// Extension resource identifiers loaded during bootstrap, in order.
    pub ext: Vec<String>,
    pub methods: MethodTable,
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub base: String,
    /// Prefix applied to every relative request url.
    pub api: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    /// Name used to tag log lines.
    pub name: String,
}

impl Default for Info {
    fn default() -> Self {
        Self { name: "Api".to_string() }
    }
}

/// Wire names used for the verb-specific entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodTable {
    pub get: String,
    pub post: String,
    pub put: String,
    pub delete: String,
}

impl Default for MethodTable {
    fn default() -> Self {
        Self {
            get: "GET".to_string(),
            post: "POST".to_string(),
            put: "PUT".to_string(),
            delete: "DELETE".to_string(),
        }
    }
}

impl MethodTable {
    /// Wire name sent to the transport for `method`.
    pub fn name_of(&self, method: HttpMethod) -> &str {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Put => &self.put,
            HttpMethod::Delete => &self.delete,
            other => other.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub accept: String,
    pub content_type: String,
    pub cache: CacheSettings,
    #[serde(skip)]
    pub body_parser: BodyParser,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accept: "json".to_string(),
            content_type: "application/json".to_string(),
            cache: CacheSettings::default(),
            body_parser: BodyParser::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ApiConfig {
    /// Parse a partial JSON document and merge it over the defaults.
    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        let overrides: Value = serde_json::from_str(raw).map_err(ApiError::Config)?;
        Self::default().merge(overrides)
    }

    /// Deep-merge `overrides` onto this configuration.
    ///
    /// The body parser is carried over unchanged.
    pub fn merge(self, overrides: Value) -> Result<Self, ApiError> {
        let body_parser = self.settings.body_parser.clone();
        let mut merged = serde_json::to_value(&self).map_err(ApiError::Config)?;
        deep_merge(&mut merged, overrides);
        let mut config: ApiConfig = serde_json::from_value(merged).map_err(ApiError::Config)?;
        config.settings.body_parser = body_parser;
        Ok(config)
    }

    pub fn with_body_parser(mut self, parser: BodyParser) -> Self {
        self.settings.body_parser = parser;
        self
    }
}

/// Recursively merge `patch` into `target`. `null` in the patch is ignored.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}
