//! Transport abstraction
//!
//! Narrow capability injected into the page fetcher and the poller so that
//! neither depends on a concrete HTTP stack.

use crate::error::Result;
use crate::types::{FetchQuery, JsonValue, Method};
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// A decoded response: status, headers and JSON body
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body (`null` for an empty body)
    pub body: JsonValue,
}

impl TransportResponse {
    /// Create a 200 response with no headers
    pub fn ok(body: JsonValue) -> Self {
        Self {
            status: 200,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Get a header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Performs a single request against the remote API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the full response
    async fn request_full(
        &self,
        method: Method,
        url: &str,
        query: &FetchQuery,
    ) -> Result<TransportResponse>;

    /// Send a request and return only the body
    async fn request(&self, method: Method, url: &str, query: &FetchQuery) -> Result<JsonValue> {
        Ok(self.request_full(method, url, query).await?.body)
    }
}
