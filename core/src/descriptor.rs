//! Caller-supplied request descriptors and batches.
//!
//! # Design
//! Descriptors are values: the pipeline takes them by value and produces a
//! separate `NormalizedCall`, so reusing a descriptor across calls never
//! observes changes made by a previous dispatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::fingerprint::{fingerprint, CacheKey};
use crate::http::HttpMethod;
use crate::types::{MediaChoice, ParamValue, Params};

/// Description of one HTTP call before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Params::is_empty")]
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "MediaChoice::is_inherit")]
    pub accept: MediaChoice,
    #[serde(skip_serializing_if = "MediaChoice::is_inherit")]
    pub content_type: MediaChoice,
    /// Raw overrides merged onto the normalized call last.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn accept(mut self, accept: MediaChoice) -> Self {
        self.accept = accept;
        self
    }

    pub fn content_type(mut self, content_type: MediaChoice) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn setting(mut self, name: impl Into<String>, value: Value) -> Self {
        self.settings.insert(name.into(), value);
        self
    }

    /// Cache key for this descriptor's url and parameters.
    pub fn fingerprint(&self) -> CacheKey {
        fingerprint(&self.url, &self.params)
    }
}

/// One or more descriptors submitted together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch(pub Vec<RequestDescriptor>);

impl Batch {
    /// Reject the batch if it is empty or any descriptor lacks a url.
    pub fn validate(self) -> Result<Vec<RequestDescriptor>, ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if let Some(index) = self.0.iter().position(|d| d.url.is_empty()) {
            return Err(ValidationError::MissingUrl { index });
        }
        Ok(self.0)
    }
}

impl From<RequestDescriptor> for Batch {
    fn from(descriptor: RequestDescriptor) -> Self {
        Batch(vec![descriptor])
    }
}

impl From<Vec<RequestDescriptor>> for Batch {
    fn from(descriptors: Vec<RequestDescriptor>) -> Self {
        Batch(descriptors)
    }
}

impl<const N: usize> From<[RequestDescriptor; N]> for Batch {
    fn from(descriptors: [RequestDescriptor; N]) -> Self {
        Batch(descriptors.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_fields() {
        let d = RequestDescriptor::new("/users/{{id}}")
            .method(HttpMethod::Put)
            .param("id", 3)
            .body(json!({"name": "a"}))
            .header("x-trace", "1")
            .accept(MediaChoice::Omit)
            .setting("timeout", json!(5));
        assert_eq!(d.method, Some(HttpMethod::Put));
        assert_eq!(d.params["id"], ParamValue::Int(3));
        assert_eq!(d.headers.unwrap()["x-trace"], "1");
        assert_eq!(d.accept, MediaChoice::Omit);
        assert_eq!(d.content_type, MediaChoice::Inherit);
        assert_eq!(d.settings["timeout"], 5);
    }

    #[test]
    fn deserializes_from_wire_shape() {
        let d: RequestDescriptor = serde_json::from_value(json!({
            "url": "/x",
            "method": "DELETE",
            "params": {"a": 1},
            "contentType": false
        }))
        .unwrap();
        assert_eq!(d.method, Some(HttpMethod::Delete));
        assert_eq!(d.content_type, MediaChoice::Omit);
        assert_eq!(d.accept, MediaChoice::Inherit);
    }

    #[test]
    fn unknown_wire_method_is_rejected_on_decode() {
        let err = serde_json::from_value::<RequestDescriptor>(json!({
            "url": "/x",
            "method": "TRACE"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("TRACE"), "{err}");
    }

    #[test]
    fn single_descriptor_becomes_one_element_batch() {
        let batch = Batch::from(RequestDescriptor::new("/x"));
        assert_eq!(batch.validate().unwrap().len(), 1);
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_eq!(Batch::default().validate(), Err(ValidationError::EmptyBatch));
    }

    #[test]
    fn any_missing_url_rejects_the_batch() {
        let batch = Batch::from([
            RequestDescriptor::new("/a"),
            RequestDescriptor::new(""),
            RequestDescriptor::new("/c"),
        ]);
        assert_eq!(
            batch.validate(),
            Err(ValidationError::MissingUrl { index: 1 })
        );
    }

    #[test]
    fn fingerprint_ignores_method_and_body() {
        let a = RequestDescriptor::new("/x").param("p", 1);
        let b = RequestDescriptor::new("/x")
            .param("p", 1)
            .method(HttpMethod::Post)
            .body(json!({}));
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
