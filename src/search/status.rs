//! Response status validation

use crate::error::{Result, SearchError};
use serde_json::Value;
use tracing::debug;

pub const STATUS: &str = "status";
pub const ERROR: &str = "error";

/// Decides whether a parsed response represents a successful call
#[derive(Debug, Clone)]
pub struct ResponseStatusValidator {
    success_status: String,
}

impl ResponseStatusValidator {
    pub fn new(success_status: impl Into<String>) -> Self {
        Self {
            success_status: success_status.into(),
        }
    }

    /// Returns `Ok(())` when `status` equals the success marker.
    ///
    /// A missing status, or a failed status without an `error` field, is a
    /// malformed response. A failed status with `error` becomes an API error
    /// carrying the first message.
    pub fn check(&self, document: &Value) -> Result<()> {
        let status = document
            .get(STATUS)
            .ok_or_else(|| SearchError::malformed(document.to_string()))?;

        if status.as_str() == Some(self.success_status.as_str()) {
            return Ok(());
        }

        let error = document
            .get(ERROR)
            .ok_or_else(|| SearchError::malformed(document.to_string()))?;

        let message = first_message(error);
        debug!("Response status {} with error: {}", status, message);

        Err(SearchError::Api {
            message,
            raw_response: document.to_string(),
        })
    }
}

impl Default for ResponseStatusValidator {
    fn default() -> Self {
        Self::new("OK")
    }
}

fn first_message(error: &Value) -> String {
    match error {
        Value::Array(messages) => messages.first().map(text_of).unwrap_or_default(),
        Value::String(message) => message.clone(),
        _ => String::new(),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
