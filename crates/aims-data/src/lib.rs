//! HTTP client utilities for the AIMS storefront.
//!
//! A thin fetch wrapper: every call is relative to one backend base URL,
//! sends JSON, and turns any non-2xx answer into [`FetchError::HttpError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use aims_data::FetchClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Quote {
//!     #[serde(rename = "totalShipping")]
//!     total_shipping: i64,
//! }
//!
//! let client = FetchClient::reqwest("http://localhost:8080", Duration::from_secs(10))?;
//!
//! let quote: Quote = client
//!     .post("/recalculate")
//!     .json(&body)?
//!     .send_json()
//!     .await?;
//! ```

mod error;
mod request;
mod response;
mod transport;

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for the storefront backend.
#[derive(Debug, Clone)]
pub struct FetchClient {
    base_url: String,
    default_headers: BTreeMap<String, String>,
    transport: Arc<dyn Transport>,
}

impl FetchClient {
    /// Create a client sending through `transport`.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: BTreeMap::new(),
            transport,
        }
    }

    /// Create a client backed by [`ReqwestTransport`].
    pub fn reqwest(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(base_url, Arc::new(ReqwestTransport::new(timeout)?)))
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

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = if url.starts_with("http://") || url.starts_with("https://") {
            url
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), url)
        };

        let mut builder = RequestBuilder::new(method, full_url)
            .header("Content-Type", "application/json");
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
        }
    }
}

/// A request builder bound to a client.
#[derive(Debug)]
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Append a query-string parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Send the request, failing on non-2xx responses.
    pub async fn send(self) -> Result<Response, FetchError> {
        let method = self.builder.method().as_str();
        let url = self.builder.url().to_string();
        tracing::debug!(method, %url, "sending backend request");

        let result = self.transport.send(self.builder).await;
        match result {
            Ok(response) => {
                tracing::debug!(method, %url, status = response.status, "backend responded");
                response.error_for_status()
            }
            Err(error) => {
                tracing::warn!(method, %url, %error, "backend request failed");
                Err(error)
            }
        }
    }

    /// Send the request and parse the JSON body.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        self.send().await?.json()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recording {
        sent: Mutex<Vec<RequestBuilder>>,
        status: u16,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
            self.sent.lock().unwrap().push(request);
            Ok(Response::new(self.status, BTreeMap::new(), br#"{"ok":true}"#.to_vec()))
        }
    }

    #[tokio::test]
    async fn test_relative_urls_use_base() {
        let transport = Arc::new(Recording { status: 200, ..Default::default() });
        let client = FetchClient::new("http://localhost:8080/", transport.clone());

        client.get("/product/all").send().await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].url(), "http://localhost:8080/product/all");
        assert_eq!(sent[0].method(), Method::Get);
    }

    #[tokio::test]
    async fn test_absolute_urls_are_kept() {
        let transport = Arc::new(Recording { status: 200, ..Default::default() });
        let client = FetchClient::new("http://localhost:8080", transport.clone());

        client.get("https://pay.example/return").send().await.unwrap();

        assert_eq!(transport.sent.lock().unwrap()[0].url(), "https://pay.example/return");
    }

    #[tokio::test]
    async fn test_default_headers_applied() {
        let transport = Arc::new(Recording { status: 200, ..Default::default() });
        let client = FetchClient::new("http://api", transport.clone())
            .with_default_header("X-Client", "aims");

        client.post("/recalculate").send().await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].headers().get("X-Client").map(String::as_str), Some("aims"));
        assert_eq!(
            sent[0].headers().get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_non_success_becomes_error() {
        let transport = Arc::new(Recording { status: 502, ..Default::default() });
        let client = FetchClient::new("http://api", transport);

        let err = client.post("/finish-order").send().await.unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn test_send_json() {
        let transport = Arc::new(Recording { status: 200, ..Default::default() });
        let client = FetchClient::new("http://api", transport);

        let value: serde_json::Value = client.get("/x").send_json().await.unwrap();
        assert_eq!(value["ok"], true);
    }
}
