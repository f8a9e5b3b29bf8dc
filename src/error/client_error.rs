use thiserror::Error;

use super::category::ErrorCategory;
use crate::sse::MaterializeError;
use crate::traits::HttpError;

/// Every failure a client call can resolve with.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Connection, timeout or I/O failure, before or during the body.
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// Non-2xx status. The body is never decoded as a stream.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// A chat turn ended without a `done` identifier (strict mode only).
    #[error("Stream ended without a conversation id")]
    MissingConversationId,

    /// A frame could not be materialized (strict mode only).
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] MaterializeError),

    /// A buffered response body did not match the expected JSON shape.
    #[error("Failed to decode {context} response: {message}")]
    Decode { context: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Build a status error from a response body, preferring the server's
    /// `{"error": "..."}` text when present.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());
        ClientError::Status { status, message }
    }

    pub fn decode(context: impl Into<String>, err: serde_json::Error) -> Self {
        ClientError::Decode {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Transport(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            ClientError::Transport(_) => ErrorCategory::Network,
            ClientError::Status { status, .. } if *status >= 500 => ErrorCategory::Server,
            ClientError::Status { .. } => ErrorCategory::Request,
            ClientError::Cancelled => ErrorCategory::Cancelled,
            ClientError::MissingConversationId
            | ClientError::MalformedFrame(_)
            | ClientError::Decode { .. } => ErrorCategory::Protocol,
            ClientError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether repeating the call could plausibly succeed. Informational
    /// only: nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Status { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            other => other.category().is_retryable(),
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport(HttpError::Timeout(_)) => "E_NET_TIMEOUT",
            ClientError::Transport(_) => "E_NET",
            ClientError::Status { .. } => "E_HTTP_STATUS",
            ClientError::Cancelled => "E_CANCELLED",
            ClientError::MissingConversationId => "E_NO_CONVERSATION_ID",
            ClientError::MalformedFrame(_) => "E_FRAME",
            ClientError::Decode { .. } => "E_DECODE",
            ClientError::Config(_) => "E_CONFIG",
        }
    }
}
