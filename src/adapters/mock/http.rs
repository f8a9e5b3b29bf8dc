//! Mock HTTP client for testing.
//!
//! Responses are scripted per URL. Streaming bodies are delivered chunk by
//! chunk exactly as configured, which lets tests place chunk boundaries
//! anywhere (mid-line, mid-blank-line, mid-UTF-8 sequence).

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{
    ByteStream, Headers, HttpClient, HttpError, HttpRequest, Response, StreamingResponse,
};

/// A recorded request for verification in tests.
pub type RecordedRequest = HttpRequest;

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Buffered response with the given status and body.
    Success(Response),
    /// Fail before any response arrives.
    Error(HttpError),
    /// Streaming body delivered as the given chunks.
    Stream { status: u16, chunks: Vec<Bytes> },
    /// Stream the chunks, then fail with the error.
    StreamFailure { chunks: Vec<Bytes>, error: HttpError },
    /// Stream the chunks under the given status, then never finish.
    StreamThenHang { status: u16, chunks: Vec<Bytes> },
}

impl MockResponse {
    /// A 200 `text/event-stream` response split into the given chunks.
    pub fn sse<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        MockResponse::Stream {
            status: 200,
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// A buffered JSON response.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::new(status, Bytes::from(value.to_string())))
    }
}

/// Mock HTTP client for testing.
///
/// Clones share configured responses and recorded requests.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL.
    ///
    /// Matching is exact first, then longest configured prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record_request(&self, request: &HttpRequest) {
        self.requests.lock().unwrap().push(request.clone());
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        let prefix_match = responses
            .iter()
            .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, response)| response.clone());
        if prefix_match.is_some() {
            return prefix_match;
        }

        self.default_response.lock().unwrap().clone()
    }

    fn chunk_stream(chunks: Vec<Bytes>) -> ByteStream {
        Box::pin(stream::iter(chunks.into_iter().map(Ok)))
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<Response, HttpError> {
        self.record_request(&request);

        match self.get_response(&request.url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Stream { status, chunks }) => {
                let body: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
                Ok(Response::new(status, Bytes::from(body)))
            }
            Some(MockResponse::StreamFailure { error, .. }) => Err(error),
            Some(MockResponse::StreamThenHang { .. }) => Err(HttpError::Other(
                "Hanging stream configured for buffered request".to_string(),
            )),
            None => Err(HttpError::Other(format!(
                "No mock response for URL: {}",
                request.url
            ))),
        }
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse, HttpError> {
        self.record_request(&request);

        let (status, body): (u16, ByteStream) = match self.get_response(&request.url) {
            Some(MockResponse::Success(response)) => {
                (response.status, Self::chunk_stream(vec![response.body]))
            }
            Some(MockResponse::Error(err)) => return Err(err),
            Some(MockResponse::Stream { status, chunks }) => (status, Self::chunk_stream(chunks)),
            Some(MockResponse::StreamFailure { chunks, error }) => {
                let body: ByteStream = Box::pin(
                    stream::iter(chunks.into_iter().map(Ok))
                        .chain(stream::once(async move { Err(error) })),
                );
                (200, body)
            }
            Some(MockResponse::StreamThenHang { status, chunks }) => {
                let body: ByteStream =
                    Box::pin(stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending()));
                (status, body)
            }
            None => {
                return Err(HttpError::Other(format!(
                    "No mock response for URL: {}",
                    request.url
                )))
            }
        };

        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "text/event-stream".to_string());
        Ok(StreamingResponse {
            status,
            headers,
            body,
        })
    }
}
