//! HTTP response handling and the `{data, success}` envelope.

use crate::FetchError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use storefront_commerce::search::Pagination;

/// Pagination metadata that may accompany a list response.
pub type PaginationInfo = Pagination;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with the given status.
    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        // Serializing a Value cannot fail.
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(status, headers, body)
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response was a client error (4xx status).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response was a server error (5xx status).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::ParseError(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::ParseError(e.to_string()))
    }

    /// Get a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        let key_lower = key.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == key_lower)
            .map(|(_, v)| v.as_str())
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    ///
    /// The error message is the status reason phrase, so it always carries
    /// the numeric status (`HTTP 404: Not Found`).
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::HttpError {
                status: self.status,
                message: reason_phrase(self.status).to_string(),
            })
        }
    }

    /// Decode the body into an [`ApiResponse`].
    ///
    /// A body that is already an envelope (has both `data` and `success`)
    /// is used as is; anything else is wrapped as `{data: body, success:
    /// true}`. An envelope with `success: false` becomes an error.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<ApiResponse<T>, FetchError> {
        let value: serde_json::Value = if self.body.iter().all(u8::is_ascii_whitespace) {
            serde_json::Value::Null
        } else {
            self.json()?
        };

        let is_envelope = value
            .as_object()
            .is_some_and(|o| o.contains_key("data") && o.contains_key("success"));

        let response = if is_envelope {
            serde_json::from_value::<ApiResponse<T>>(value)
                .map_err(|e| FetchError::ParseError(e.to_string()))?
        } else {
            ApiResponse::ok(
                serde_json::from_value::<T>(value)
                    .map_err(|e| FetchError::ParseError(e.to_string()))?,
            )
        };

        if response.success {
            Ok(response)
        } else {
            Err(FetchError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            ))
        }
    }
}

/// The uniform result of every gateway call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
            message: None,
            pagination: None,
        }
    }

    /// Transform the payload, keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            success: self.success,
            message: self.message,
            pagination: self.pagination,
        }
    }
}

/// Canonical reason phrase for a status code.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown Status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &[u8]) -> Response {
        Response::new(status, HashMap::new(), body.to_vec())
    }

    #[test]
    fn test_response_status_classes() {
        assert!(make_response(201, b"").is_success());
        assert!(make_response(404, b"").is_client_error());
        assert!(make_response(503, b"").is_server_error());
        assert!(!make_response(300, b"").is_success());
    }

    #[test]
    fn test_error_for_status_carries_status() {
        let err = make_response(404, b"{}").error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_envelope_wraps_bare_body() {
        let resp = make_response(200, br#"[1, 2, 3]"#);
        let api: ApiResponse<Vec<u32>> = resp.envelope().unwrap();
        assert!(api.success);
        assert_eq!(api.data, vec![1, 2, 3]);
        assert_eq!(api.pagination, None);
    }

    #[test]
    fn test_envelope_passes_through_existing_envelope() {
        let resp = make_response(
            200,
            br#"{"data": [1], "success": true, "message": "ok",
                "pagination": {"page": 1, "limit": 12, "total": 1, "totalPages": 1}}"#,
        );
        let api: ApiResponse<Vec<u32>> = resp.envelope().unwrap();
        assert_eq!(api.data, vec![1]);
        assert_eq!(api.message.as_deref(), Some("ok"));
        assert_eq!(api.pagination.map(|p| p.total_pages), Some(1));
    }

    #[test]
    fn test_envelope_object_with_data_field_only_is_wrapped() {
        let resp = make_response(200, br#"{"data": 5}"#);
        let api: ApiResponse<serde_json::Value> = resp.envelope().unwrap();
        assert_eq!(api.data, serde_json::json!({"data": 5}));
    }

    #[test]
    fn test_envelope_unsuccessful_is_error() {
        let resp = make_response(200, br#"{"data": null, "success": false, "message": "nope"}"#);
        let err = resp.envelope::<Option<u32>>().unwrap_err();
        assert_eq!(err, FetchError::Rejected("nope".to_string()));
    }

    #[test]
    fn test_envelope_empty_body_is_null() {
        let api: ApiResponse<()> = make_response(200, b"").envelope().unwrap();
        assert!(api.success);
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/html".to_string());
        let resp = Response::new(200, headers, Vec::new());
        assert_eq!(resp.header("content-type"), Some("text/html"));
    }
}
