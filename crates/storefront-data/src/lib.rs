//! Typed REST gateway for the storefront backend.
//!
//! [`FetchClient`] builds requests, sends them through a [`Transport`],
//! retries transient failures and normalizes every successful body into an
//! [`ApiResponse`]. The services in [`services`] map storefront operations
//! onto the REST contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_data::{ApiGateway, FetchClient};
//!
//! let client = FetchClient::new().with_base_url("http://localhost:3001");
//! let api = ApiGateway::new(client);
//!
//! let products = api.products().list(&Default::default()).await?.data;
//! let line = api.cart().add(NewCartLineItem::new("1", 2, 19.99)?).await?.data;
//! api.favorites().add(&ProductId::new("1")).await?;
//! ```

mod error;
mod request;
mod response;
mod retry;
mod transport;

pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{ErrorKind, FetchError};
pub use request::{Method, Request, RequestBuilder};
pub use response::{reason_phrase, ApiResponse, PaginationInfo, Response};
pub use retry::{BackoffStrategy, RetryCondition, RetryPolicy};
pub use services::{ApiGateway, ProductQuery};
pub use transport::{ReqwestTransport, Transport};

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// HTTP client for the storefront API.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
    query_policy: RetryPolicy,
    mutation_policy: RetryPolicy,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("query_policy", &self.query_policy)
            .field("mutation_policy", &self.mutation_policy)
            .finish_non_exhaustive()
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Create a new HTTP client over reqwest.
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Create a client over a custom transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            transport: Arc::new(transport),
            query_policy: RetryPolicy::query(),
            mutation_policy: RetryPolicy::mutation(),
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Retry policy for GET requests.
    pub fn with_query_policy(mut self, policy: RetryPolicy) -> Self {
        self.query_policy = policy;
        self
    }

    /// Retry policy for every other method.
    pub fn with_mutation_policy(mut self, policy: RetryPolicy) -> Self {
        self.mutation_policy = policy;
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    url
                } else {
                    format!("{}{}", base.trim_end_matches('/'), url)
                }
            }
            None => url,
        };

        let mut builder = RequestBuilder::new(method, full_url);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            client: self.clone(),
            builder,
        }
    }

    fn policy_for(&self, method: Method) -> &RetryPolicy {
        if method.is_query() {
            &self.query_policy
        } else {
            &self.mutation_policy
        }
    }

    /// Send a request, retrying per policy. Non-2xx statuses are errors.
    pub async fn execute(&self, request: Request) -> Result<Response, FetchError> {
        let policy = self.policy_for(request.method);
        let mut attempt = 0;

        loop {
            debug!(method = %request.method, url = %request.url, attempt, "sending request");
            let result = self
                .transport
                .send(request.clone())
                .await
                .and_then(Response::error_for_status);

            match result {
                Ok(response) => return Ok(response),
                Err(err) if policy.should_retry(&err, attempt) => {
                    let delay = policy.backoff.delay_for_attempt(attempt);
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        status = err.status(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        status = err.status(),
                        error = %err,
                        "API request failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    client: FetchClient,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Append a query parameter when `value` is present.
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.builder = self.builder.query_opt(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// Send the request and return the raw response.
    pub async fn send(self) -> Result<Response, FetchError> {
        self.client.execute(self.builder.build()).await
    }

    /// Send the request and decode the body into an envelope.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<ApiResponse<T>, FetchError> {
        self.send().await?.envelope()
    }

    /// Send the request, ignoring whatever body comes back.
    pub async fn fetch_empty(self) -> Result<ApiResponse<()>, FetchError> {
        self.send().await?;
        Ok(ApiResponse::ok(()))
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::services::{
        ApiGateway, CartService, CategoryService, FavoritesService, ProductQuery, ProductService,
    };
    pub use crate::{
        ApiResponse, ErrorKind, FetchClient, FetchError, Method, Response, RetryPolicy, Transport,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_query_retries_then_succeeds() {
        let mock = MockBackend::new();
        mock.insert("products", serde_json::json!({"id": "1", "name": "A"}));
        mock.fail_times(Method::Get, "/products", 503, 2);

        let client = FetchClient::with_transport(mock.clone()).with_base_url("http://mock");
        let api: ApiResponse<Vec<serde_json::Value>> =
            client.get("/products").fetch().await.unwrap();

        assert_eq!(api.data.len(), 1);
        assert_eq!(mock.request_count(Method::Get, "/products"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_gives_up_after_three_retries() {
        let mock = MockBackend::new();
        mock.fail(Method::Get, "/products", 500);

        let client = FetchClient::with_transport(mock.clone());
        let err = client.get("/products").send().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(mock.request_count(Method::Get, "/products"), 4);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mock = MockBackend::new();
        let client = FetchClient::with_transport(mock.clone());

        let err = client.get("/products/missing").send().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(mock.request_count(Method::Get, "/products/missing"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_retries_once() {
        let mock = MockBackend::new();
        mock.fail(Method::Post, "/cart", 502);

        let client = FetchClient::with_transport(mock.clone());
        let started = tokio::time::Instant::now();
        let err = client
            .post("/cart")
            .json(&serde_json::json!({"productId": "1"}))
            .unwrap()
            .send()
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert_eq!(mock.request_count(Method::Post, "/cart"), 2);
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_is_retried_and_classified() {
        let mock = MockBackend::new();
        mock.set_offline(true);

        let client = FetchClient::with_transport(mock.clone());
        let err = client.get("/cart").send().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(mock.request_count(Method::Get, "/cart"), 4);
    }

    #[test]
    fn test_base_url_joining() {
        let client = FetchClient::with_transport(MockBackend::new())
            .with_base_url("http://localhost:3001/")
            .with_default_header("X-Client", "storefront");
        let request = client.get("/products").builder.build();
        assert_eq!(request.url, "http://localhost:3001/products");
        assert_eq!(request.headers.get("X-Client").map(String::as_str), Some("storefront"));

        let request = client.get("https://other.example/x").builder.build();
        assert_eq!(request.url, "https://other.example/x");
    }
}
