//! Response envelope decoding.
//!
//! List endpoints answer either with a bare array or with the array wrapped
//! in `{"data": [...]}`; anything else is treated as malformed. The shape is
//! decided once here so services only choose what to do with `Malformed`:
//! propagate it as an error, or fall back to an empty list.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// `[...]`
    Direct(Vec<T>),
    /// `{"data": [...]}`
    Wrapped(Vec<T>),
    Malformed(String),
}

impl<T: DeserializeOwned> Envelope<T> {
    pub fn decode(value: Value) -> Self {
        match value {
            Value::Array(_) => match serde_json::from_value(value) {
                Ok(items) => Envelope::Direct(items),
                Err(err) => Envelope::Malformed(err.to_string()),
            },
            Value::Object(mut map) => match map.remove("data") {
                Some(data @ Value::Array(_)) => match serde_json::from_value(data) {
                    Ok(items) => Envelope::Wrapped(items),
                    Err(err) => Envelope::Malformed(err.to_string()),
                },
                Some(_) => Envelope::Malformed("`data` is not an array".to_string()),
                None => Envelope::Malformed("object without `data`".to_string()),
            },
            Value::Null => Envelope::Malformed("empty body".to_string()),
            other => Envelope::Malformed(format!("unexpected {}", json_kind(&other))),
        }
    }

    pub fn decode_str(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => Self::decode(value),
            Err(err) => Envelope::Malformed(err.to_string()),
        }
    }
}

impl<T> Envelope<T> {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Envelope::Malformed(_))
    }

    /// The contained items; empty when malformed.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Envelope::Direct(items) | Envelope::Wrapped(items) => items,
            Envelope::Malformed(_) => Vec::new(),
        }
    }

    pub fn into_result(self) -> Result<Vec<T>> {
        match self {
            Envelope::Direct(items) | Envelope::Wrapped(items) => Ok(items),
            Envelope::Malformed(reason) => Err(ApiError::DeserializationError(format!(
                "unexpected list envelope: {reason}"
            ))),
        }
    }
}

/// Single-object envelope: `{"data": T}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
