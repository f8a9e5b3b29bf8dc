//! Shared fixtures for integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use serde_json::Value;

use nlui_client::adapters::MockHttpClient;
use nlui_client::prelude::*;

pub const MOCK_BASE: &str = "http://mock.nlui";
pub const CHAT_URL: &str = "http://mock.nlui/api/chat";

/// One well-formed frame.
pub fn frame(event: &str, data: Value) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

/// `content_delta` frames for each fragment, then `done`.
pub fn chat_body(deltas: &[&str], conversation_id: &str) -> String {
    let mut body: String = deltas
        .iter()
        .map(|d| frame("content_delta", serde_json::json!({ "delta": d })))
        .collect();
    body.push_str(&frame(
        "done",
        serde_json::json!({ "conversation_id": conversation_id }),
    ));
    body
}

/// Split a body into chunks of `size` bytes, ignoring char boundaries.
pub fn chunked(body: &str, size: usize) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(size)
        .map(Bytes::copy_from_slice)
        .collect()
}

pub fn mock_client(http: &MockHttpClient) -> NluiClient<MockHttpClient> {
    NluiClient::with_http_client(http.clone(), ClientConfig::new(MOCK_BASE))
}

pub fn mock_client_with(http: &MockHttpClient, config: ClientConfig) -> NluiClient<MockHttpClient> {
    NluiClient::with_http_client(http.clone(), config)
}
