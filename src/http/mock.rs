//! Scripted transport for unit tests

use super::transport::{Transport, TransportResponse};
use crate::error::{Error, Result};
use crate::types::{FetchQuery, JsonValue, Method};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request as seen by [`MockTransport`]
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: FetchQuery,
}

/// Replays queued responses in order and records every request
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a body with no pagination header
    pub fn push_body(&self, body: JsonValue) -> &Self {
        self.push_response(Ok(TransportResponse::ok(body)))
    }

    /// Queue a listing page with an `x-total-pages` header value
    pub fn push_page(&self, body: JsonValue, total_pages: &str) -> &Self {
        let mut headers = HeaderMap::new();
        headers.insert("x-total-pages", HeaderValue::from_str(total_pages).unwrap());
        self.push_response(Ok(TransportResponse {
            status: 200,
            headers,
            body,
        }))
    }

    /// Queue a failure
    pub fn push_error(&self, error: Error) -> &Self {
        self.push_response(Err(error))
    }

    fn push_response(&self, response: Result<TransportResponse>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_full(
        &self,
        method: Method,
        url: &str,
        query: &FetchQuery,
    ) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            query: query.clone(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::config("mock transport has no scripted response left")))
    }
}
