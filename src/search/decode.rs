//! Typed decoding of JSON subtrees

use crate::error::{Result, SearchError};
use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// Decodes nodes of one response, tagging failures with its raw text
pub(crate) struct Decoder<'a> {
    raw_response: &'a str,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(raw_response: &'a str) -> Self {
        Self { raw_response }
    }

    /// Decode an array node into a list of `T`
    pub(crate) fn list<T: DeserializeOwned>(&self, node: &Value) -> Result<Vec<T>> {
        Vec::<T>::deserialize(node).map_err(|e| self.error(e))
    }

    /// Decode an object node into string pairs.
    ///
    /// Scalars are rendered as text and nulls are skipped; nested arrays or
    /// objects are rejected.
    pub(crate) fn string_map(&self, node: &Value) -> Result<IndexMap<String, String>> {
        let object = node.as_object().ok_or_else(|| {
            self.error(serde_json::Error::custom(format!(
                "expected a map of strings, found {}",
                kind_of(node)
            )))
        })?;

        let mut map = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            match value {
                Value::Null => continue,
                Value::Array(_) | Value::Object(_) => {
                    return Err(self.error(serde_json::Error::custom(format!(
                        "expected a string for key `{}`, found {}",
                        key,
                        kind_of(value)
                    ))));
                }
                scalar => {
                    map.insert(key.clone(), scalar_text(scalar).unwrap_or_default());
                }
            }
        }
        Ok(map)
    }

    pub(crate) fn raw_response(&self) -> &'a str {
        self.raw_response
    }

    pub(crate) fn error(&self, source: serde_json::Error) -> SearchError {
        SearchError::deserialization(source, self.raw_response)
    }
}

/// Text of a scalar node, `None` for null, arrays and objects
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer value of a node, accepting numeric strings
pub(crate) fn integer<T: TryFrom<u64>>(value: &Value) -> Option<T> {
    let raw = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    T::try_from(raw).ok()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
