//! Turns a `RequestDescriptor` plus configuration into a transport-ready call.
//!
//! # Design
//! Normalization borrows both inputs and builds a fresh `NormalizedCall`.
//! Per-call `settings` are applied last by round-tripping the call through a
//! JSON object, which lets a setting replace any typed field (url, method,
//! headers, ...) as well as add fields the transport understands but this
//! crate does not model; those land in `extra`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::config::ApiConfig;
use crate::descriptor::RequestDescriptor;
use crate::error::{ApiError, ValidationError};
use crate::http::HttpMethod;
use crate::template::{append_query, resolve};

/// A request ready for the transport collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCall {
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Body after the configured body parser ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Settings with no typed counterpart, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether `url` carries its own scheme and authority.
pub fn is_absolute(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| !parsed.cannot_be_a_base())
        .unwrap_or(false)
}

/// Build the transport call for `descriptor`.
///
/// A descriptor without a method is sent as GET.
pub fn normalize(descriptor: &RequestDescriptor, config: &ApiConfig) -> Result<NormalizedCall, ApiError> {
    if descriptor.url.is_empty() {
        return Err(ValidationError::MissingUrl { index: 0 }.into());
    }

    let resolved = resolve(&descriptor.url, &descriptor.params);
    let mut url = append_query(&resolved.url, &resolved.remaining)?;
    if !is_absolute(&url) {
        url = format!("{}{url}", config.paths.api);
    }

    let settings = &config.settings;
    let data = descriptor
        .body
        .as_ref()
        .map(|body| settings.body_parser.parse(body))
        .transpose()?;

    let call = NormalizedCall {
        url,
        method: config
            .methods
            .name_of(descriptor.method.unwrap_or(HttpMethod::Get))
            .to_string(),
        headers: descriptor.headers.clone(),
        accept: descriptor.accept.resolve(&settings.accept),
        content_type: descriptor.content_type.resolve(&settings.content_type),
        data,
        extra: Map::new(),
    };

    if descriptor.settings.is_empty() {
        return Ok(call);
    }
    apply_settings(call, &descriptor.settings)
}

fn apply_settings(call: NormalizedCall, settings: &Map<String, Value>) -> Result<NormalizedCall, ApiError> {
    let mut fields = match serde_json::to_value(call).map_err(ApiError::InvalidSettings)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    for (key, value) in settings {
        fields.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(fields)).map_err(ApiError::InvalidSettings)
}
