//! Scalar value types carried by request descriptors.
//!
//! # Design
//! Parameters live in a `BTreeMap` so that iteration, query-string encoding
//! and fingerprinting all see keys in one canonical order regardless of how
//! the caller inserted them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Path and query parameters, keyed by name.
pub type Params = BTreeMap<String, ParamValue>;

/// A single parameter value. Coerced to a string when substituted into a
/// url or encoded into a query string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(n) => write!(f, "{n}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Str(s) => serializer.serialize_str(s),
            ParamValue::Int(n) => serializer.serialize_i64(*n),
            ParamValue::Float(n) => serializer.serialize_f64(*n),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
            Float(f64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => ParamValue::Bool(b),
            Raw::Int(n) => ParamValue::Int(n),
            Raw::Float(n) => ParamValue::Float(n),
            Raw::Str(s) => ParamValue::Str(s),
        })
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::Int(i64::from(value))
            }
        })*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

/// Per-descriptor choice for the `accept` and `contentType` fields.
///
/// On the wire (test vectors, configuration) `false` means `Omit`, a string
/// means `Explicit`, and absence or `null` means `Inherit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MediaChoice {
    /// Fall back to the configured default.
    #[default]
    Inherit,
    /// Leave the field out of the normalized call.
    Omit,
    Explicit(String),
}

impl MediaChoice {
    /// Resolve against the configured default.
    pub fn resolve(&self, default: &str) -> Option<String> {
        match self {
            MediaChoice::Inherit => Some(default.to_string()),
            MediaChoice::Omit => None,
            MediaChoice::Explicit(value) => Some(value.clone()),
        }
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, MediaChoice::Inherit)
    }
}

impl From<&str> for MediaChoice {
    fn from(value: &str) -> Self {
        MediaChoice::Explicit(value.to_string())
    }
}

impl Serialize for MediaChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MediaChoice::Inherit => serializer.serialize_none(),
            MediaChoice::Omit => serializer.serialize_bool(false),
            MediaChoice::Explicit(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for MediaChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Value(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Flag(true)) => MediaChoice::Inherit,
            Some(Raw::Flag(false)) => MediaChoice::Omit,
            Some(Raw::Value(value)) => MediaChoice::Explicit(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_values_coerce_like_strings() {
        assert_eq!(ParamValue::from(5).to_string(), "5");
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from(2.5).to_string(), "2.5");
        assert_eq!(ParamValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn param_values_deserialize_from_json_scalars() {
        let params: Params =
            serde_json::from_str(r#"{"a":1,"b":1.5,"c":true,"d":"x"}"#).unwrap();
        assert_eq!(params["a"], ParamValue::Int(1));
        assert_eq!(params["b"], ParamValue::Float(1.5));
        assert_eq!(params["c"], ParamValue::Bool(true));
        assert_eq!(params["d"], ParamValue::Str("x".into()));
    }

    #[test]
    fn media_choice_wire_format() {
        let omit: MediaChoice = serde_json::from_str("false").unwrap();
        let inherit: MediaChoice = serde_json::from_str("null").unwrap();
        let explicit: MediaChoice = serde_json::from_str(r#""text/plain""#).unwrap();
        assert_eq!(omit, MediaChoice::Omit);
        assert_eq!(inherit, MediaChoice::Inherit);
        assert_eq!(explicit, MediaChoice::Explicit("text/plain".into()));
    }

    #[test]
    fn media_choice_resolves_against_default() {
        assert_eq!(MediaChoice::Inherit.resolve("json").as_deref(), Some("json"));
        assert_eq!(MediaChoice::Omit.resolve("json"), None);
        assert_eq!(
            MediaChoice::from("xml").resolve("json").as_deref(),
            Some("xml")
        );
    }
}
