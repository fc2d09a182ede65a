//! Error types for the IG integration.

use thiserror::Error;

/// Errors that can occur when talking to the IG gateway.
#[derive(Debug, Error)]
pub enum IgError {
    /// Login was rejected or returned no session tokens.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// API request failed.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Body returned by the gateway (usually an `errorCode`).
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit {
        /// Seconds to wait before retry.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// An identifier would not form a safe URL path segment.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A required response header was absent.
    #[error("missing response header: {name}")]
    MissingHeader {
        /// Header name.
        name: String,
    },
}

impl IgError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a rate limit error.
    pub fn rate_limit(retry_after_secs: u64) -> Self {
        Self::RateLimit { retry_after_secs }
    }

    /// Creates a missing header error.
    pub fn missing_header(name: impl Into<String>) -> Self {
        Self::MissingHeader { name: name.into() }
    }
}

impl From<reqwest::Error> for IgError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::Serialization(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for IgError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for IG operations.
pub type Result<T> = std::result::Result<T, IgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = IgError::api(400, r#"{"errorCode":"error.service.marketdata.position.notional.details.null.error"}"#);
        let display = err.to_string();
        assert!(display.contains("400"));
        assert!(display.contains("errorCode"));
    }

    #[test]
    fn test_rate_limit_display() {
        let err = IgError::rate_limit(30);
        assert!(matches!(err, IgError::RateLimit { retry_after_secs: 30 }));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_auth_error_display() {
        let err = IgError::Authentication("invalid.details".to_string());
        assert!(err.to_string().contains("authentication"));
    }

    #[test]
    fn test_missing_header_names_header() {
        let err = IgError::missing_header("CST");
        assert!(err.to_string().contains("CST"));
    }
}
