//! HTTP transport trait abstraction.
//!
//! The client never talks to `reqwest` directly: every call goes through
//! [`HttpClient`], so the streaming pipeline can be driven by the production
//! adapter or by a scripted mock in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// A body delivered incrementally, chunk by chunk, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP verbs used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully described outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    /// Serialized JSON body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Add a header, replacing any previous value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a JSON body and the matching content type.
    pub fn json_body(mut self, body: String) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(body);
        self
    }

    /// Look up a header case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Response whose headers have arrived but whose body is still streaming.
///
/// The status is exposed before any body byte is read so that callers can
/// refuse to decode error bodies.
pub struct StreamingResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: ByteStream,
}

impl StreamingResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read at most `max_bytes` of the body as text, giving up after `wait`.
    ///
    /// Used for error bodies only. A body that stalls or fails yields
    /// whatever arrived before it did.
    pub async fn read_prefix(self, max_bytes: usize, wait: Duration) -> String {
        use futures_util::StreamExt;

        let mut body = self.body;
        let mut buf = Vec::new();
        let read = async {
            while buf.len() < max_bytes {
                match body.next().await {
                    Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
                    Some(Err(_)) | None => break,
                }
            }
        };
        if tokio::time::timeout(wait, read).await.is_err() {
            tracing::debug!(status = self.status, "Error body did not finish, using the prefix");
        }
        buf.truncate(max_bytes);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Transport-level failures.
///
/// Status codes are not transport failures: a non-2xx response is still a
/// successful exchange at this layer and is reported through
/// [`Response::status`] / [`StreamingResponse::status`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request timeout: {0}")]
    Timeout(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Other(String),
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout(_))
    }
}

/// Transport collaborator.
///
/// Implementations must be safe to share across concurrently running
/// calls; the client holds one instance behind an `Arc`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and buffer the whole response body.
    async fn send(&self, request: HttpRequest) -> Result<Response, HttpError>;

    /// Send a request and return as soon as the status line and headers
    /// are available, leaving the body as a chunk stream.
    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_success() {
        assert!(Response::new(200, Bytes::new()).is_success());
        assert!(Response::new(204, Bytes::new()).is_success());
        assert!(!Response::new(300, Bytes::new()).is_success());
        assert!(!Response::new(404, Bytes::new()).is_success());
        assert!(!Response::new(500, Bytes::new()).is_success());
    }

    #[test]
    fn test_response_json() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Health {
            status: String,
            tools: u32,
        }

        let response = Response::new(200, Bytes::from(r#"{"status":"ok","tools":3}"#));
        let health: Health = response.json().unwrap();
        assert_eq!(
            health,
            Health {
                status: "ok".to_string(),
                tools: 3
            }
        );
    }

    #[test]
    fn test_request_json_body_sets_content_type() {
        let request = HttpRequest::new(Method::Post, "http://localhost/api/chat")
            .json_body(r#"{"message":"hi"}"#.to_string());
        assert_eq!(request.header_value("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"message":"hi"}"#));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request =
            HttpRequest::new(Method::Get, "http://x").header("Accept", "text/event-stream");
        assert_eq!(request.header_value("accept"), Some("text/event-stream"));
        assert_eq!(request.header_value("ACCEPT"), Some("text/event-stream"));
        assert_eq!(request.header_value("authorization"), None);
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            HttpError::Timeout("30s".to_string()).to_string(),
            "Request timeout: 30s"
        );
        assert_eq!(
            HttpError::Io("reset".to_string()).to_string(),
            "IO error: reset"
        );
        assert!(HttpError::Timeout(String::new()).is_timeout());
        assert!(!HttpError::Io(String::new()).is_timeout());
    }

    #[tokio::test]
    async fn test_streaming_response_read_prefix() {
        let chunks = vec![Ok(Bytes::from("inter")), Ok(Bytes::from("nal error"))];
        let response = StreamingResponse {
            status: 500,
            headers: Headers::new(),
            body: Box::pin(futures::stream::iter(chunks)),
        };
        assert!(!response.is_success());
        assert_eq!(
            response.read_prefix(1024, Duration::from_secs(1)).await,
            "internal error"
        );
    }

    #[tokio::test]
    async fn test_read_prefix_caps_length() {
        let response = StreamingResponse {
            status: 502,
            headers: Headers::new(),
            body: Box::pin(futures::stream::iter(vec![Ok(Bytes::from("abcdef")), Ok(Bytes::from("ghij"))])),
        };
        assert_eq!(response.read_prefix(4, Duration::from_secs(1)).await, "abcd");
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_prefix_stops_on_open_body() {
        use futures::StreamExt;

        let body = futures::stream::iter(vec![Ok(Bytes::from("partial"))])
            .chain(futures::stream::pending());
        let response = StreamingResponse {
            status: 500,
            headers: Headers::new(),
            body: Box::pin(body),
        };
        assert_eq!(response.read_prefix(1024, Duration::from_secs(2)).await, "partial");
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
