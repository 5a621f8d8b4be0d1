//! Error types for the ViSearch client

use std::path::Path;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SearchError>;

/// Message used when a response document does not have the expected structure
pub const INVALID_RESPONSE_FORMAT: &str = "Invalid response format";
/// Message used when a response (or a field of it) cannot be decoded
pub const PARSE_RESPONSE_ERROR: &str = "Could not parse the response";

/// Everything that can go wrong while performing a search call
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid response format")]
    MalformedResponse { raw_response: String },

    /// Server reported a failure with an explicit message
    #[error("{message}")]
    Api {
        message: String,
        raw_response: String,
    },

    #[error("Could not parse the response")]
    Deserialization {
        #[source]
        source: serde_json::Error,
        raw_response: String,
    },

    #[error("Must provide an im_id, an image file, an image stream or an image url")]
    MissingImageSource,

    #[error("Could not read image source {name}")]
    ImageSourceUnreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Inconsistent group data: {groups} groups but {product_types} product types")]
    InconsistentGroupData {
        groups: usize,
        product_types: usize,
        raw_response: String,
    },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    pub(crate) fn malformed(raw_response: impl Into<String>) -> Self {
        Self::MalformedResponse {
            raw_response: raw_response.into(),
        }
    }

    pub(crate) fn deserialization(source: serde_json::Error, raw_response: impl Into<String>) -> Self {
        Self::Deserialization {
            source,
            raw_response: raw_response.into(),
        }
    }

    pub(crate) fn unreadable_file(path: &Path, source: std::io::Error) -> Self {
        Self::ImageSourceUnreadable {
            name: path.display().to_string(),
            source,
        }
    }

    /// Raw server response associated with this error, if one was received
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { raw_response }
            | Self::Api { raw_response, .. }
            | Self::Deserialization { raw_response, .. }
            | Self::InconsistentGroupData { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Short stable label, used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Api { .. } => "api_error",
            Self::Deserialization { .. } => "deserialization",
            Self::MissingImageSource => "missing_image_source",
            Self::ImageSourceUnreadable { .. } => "image_source_unreadable",
            Self::InconsistentGroupData { .. } => "inconsistent_group_data",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config",
        }
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_api_error_message_is_server_text() {
        let err = SearchError::Api {
            message: "invalid api key".to_string(),
            raw_response: "{}".to_string(),
        };
        assert_eq!(err.to_string(), "invalid api key");
        assert_eq!(err.raw_response(), Some("{}"));
        assert_eq!(err.kind(), "api_error");
    }

    #[test]
    fn test_malformed_message() {
        let err = SearchError::malformed("{\"status\":\"fail\"}");
        assert_eq!(err.to_string(), INVALID_RESPONSE_FORMAT);
        assert!(err.source().is_none());
    }

    #[test]
    fn test_deserialization_keeps_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SearchError::deserialization(parse_err, "{");
        assert_eq!(err.to_string(), PARSE_RESPONSE_ERROR);
        assert!(err.source().is_some());
        assert_eq!(err.raw_response(), Some("{"));
    }

    #[test]
    fn test_client_side_errors_have_no_raw_response() {
        assert!(SearchError::MissingImageSource.raw_response().is_none());
        assert!(SearchError::Transport("refused".into()).raw_response().is_none());
    }
}
