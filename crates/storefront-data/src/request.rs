//! HTTP request builder.

use crate::FetchError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Reads are retried with the query policy, everything else with the
    /// mutation policy.
    pub fn is_query(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully described request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Absolute URL, or a bare path when the client has no base URL.
    pub url: String,
    /// Query pairs in insertion order; keys may repeat.
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// The path component of the URL (scheme and authority removed).
    pub fn path(&self) -> &str {
        let rest = match self.url.split_once("://") {
            Some((_, rest)) => rest,
            None => return &self.url,
        };
        match rest.find('/') {
            Some(index) => &rest[index..],
            None => "/",
        }
    }

    /// First value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Decode the JSON body.
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> Result<Option<T>, FetchError> {
        match &self.body {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            request: Request {
                method,
                url: url.into(),
                query: Vec::new(),
                headers,
                body: None,
            },
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.insert(key.into(), value.into());
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.request.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.request.body = Some(serde_json::to_vec(value)?);
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Finish building.
    pub fn build(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_json_headers() {
        let request = RequestBuilder::new(Method::Post, "http://localhost:3001/cart")
            .json(&serde_json::json!({"productId": "1"}))
            .unwrap()
            .build();
        assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(br#"{"productId":"1"}"#.as_slice()));
    }

    #[test]
    fn test_query_pairs_keep_order_and_repeats() {
        let request = RequestBuilder::new(Method::Get, "/products")
            .query("category", "home")
            .query("category", "sports")
            .query_opt("page", Some(2))
            .query_opt::<u32>("limit", None)
            .build();
        assert_eq!(request.query.len(), 3);
        assert_eq!(request.query_value("category"), Some("home"));
        assert_eq!(request.query_value("page"), Some("2"));
    }

    #[test]
    fn test_path_strips_authority() {
        let request = RequestBuilder::new(Method::Get, "http://localhost:3001/products/7").build();
        assert_eq!(request.path(), "/products/7");
        let request = RequestBuilder::new(Method::Get, "/cart").build();
        assert_eq!(request.path(), "/cart");
        let request = RequestBuilder::new(Method::Get, "http://localhost:3001").build();
        assert_eq!(request.path(), "/");
    }

    #[test]
    fn test_bearer_auth() {
        let request = RequestBuilder::new(Method::Get, "/cart").bearer_auth("abc").build();
        assert_eq!(request.headers.get("Authorization").map(String::as_str), Some("Bearer abc"));
    }
}
