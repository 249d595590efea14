//! HTTP client error types.

use thiserror::Error;

/// Coarse error classes used for user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport or connectivity failure.
    Network,
    /// 404.
    NotFound,
    /// 5xx.
    Server,
    /// Malformed input rejected before or by the server.
    Validation,
    /// Anything unclassified.
    Generic,
}

impl ErrorKind {
    /// Classify an error message by the markers it carries.
    pub fn classify(message: &str) -> Self {
        if message.contains("404") {
            ErrorKind::NotFound
        } else if message.contains("500") {
            ErrorKind::Server
        } else if message.contains("Network") {
            ErrorKind::Network
        } else {
            ErrorKind::Generic
        }
    }

    /// Classify an HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ErrorKind::NotFound,
            400 | 422 => ErrorKind::Validation,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Generic,
        }
    }
}

/// Errors that can occur when making HTTP requests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("Network error: request timed out")]
    Timeout,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The server answered 2xx but flagged the envelope as unsuccessful.
    #[error("{0}")]
    Rejected(String),

    /// Input rejected before anything was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FetchError {
    /// The HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_) | FetchError::Timeout => ErrorKind::Network,
            FetchError::HttpError { status, message } => match ErrorKind::from_status(*status) {
                ErrorKind::Generic => ErrorKind::classify(message),
                kind => kind,
            },
            FetchError::Validation(_) => ErrorKind::Validation,
            FetchError::Rejected(message) => ErrorKind::classify(message),
            FetchError::InvalidUrl(_) | FetchError::ParseError(_) | FetchError::JsonError(_) => {
                ErrorKind::Generic
            }
        }
    }

    /// Whether a retry could plausibly succeed (5xx, 408 or no response).
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout => true,
            FetchError::HttpError { status, .. } => *status == 408 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Text suitable for showing to a shopper.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::NotFound => "Resource not found".to_string(),
            ErrorKind::Server => "Server error. Please try again later.".to_string(),
            ErrorKind::Network => "Network error. Please check your connection.".to_string(),
            ErrorKind::Validation | ErrorKind::Generic => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else if e.is_decode() {
            FetchError::ParseError(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, message: &str) -> FetchError {
        FetchError::HttpError {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_classify_messages() {
        assert_eq!(ErrorKind::classify("HTTP 404: Not Found"), ErrorKind::NotFound);
        assert_eq!(ErrorKind::classify("HTTP 500: Internal Server Error"), ErrorKind::Server);
        assert_eq!(ErrorKind::classify("Network error"), ErrorKind::Network);
        assert_eq!(ErrorKind::classify("boom"), ErrorKind::Generic);
    }

    #[test]
    fn test_kind_from_status() {
        assert_eq!(http(404, "Not Found").kind(), ErrorKind::NotFound);
        assert_eq!(http(503, "Service Unavailable").kind(), ErrorKind::Server);
        assert_eq!(http(400, "Bad Request").kind(), ErrorKind::Validation);
        assert_eq!(http(409, "Conflict").kind(), ErrorKind::Generic);
        assert_eq!(FetchError::Network("refused".into()).kind(), ErrorKind::Network);
    }

    #[test]
    fn test_transient() {
        assert!(http(500, "x").is_transient());
        assert!(http(408, "x").is_transient());
        assert!(!http(404, "x").is_transient());
        assert!(!http(429, "x").is_transient());
        assert!(FetchError::Timeout.is_transient());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(http(404, "Not Found").user_message(), "Resource not found");
        assert_eq!(
            http(502, "Bad Gateway").user_message(),
            "Server error. Please try again later."
        );
        assert_eq!(
            FetchError::Network("refused".into()).user_message(),
            "Network error. Please check your connection."
        );
        assert_eq!(http(409, "Conflict").user_message(), "HTTP 409: Conflict");
    }
}
