//! Typed chat events materialized from frames.
//!
//! The event taxonomy is open: every frame whose data is a JSON object
//! becomes a [`ChatEvent`], whatever its name. [`EventKind`] is a
//! classification for callers, never a filter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::frame::Frame;

pub const CONTENT_DELTA: &str = "content_delta";
pub const CONTENT: &str = "content";
pub const TOOL_CALL: &str = "tool_call";
pub const TOOL_RESULT: &str = "tool_result";
pub const TOOL_CONFIRM: &str = "tool_confirm";
pub const SESSION: &str = "session";
pub const USAGE: &str = "usage";
pub const ERROR: &str = "error";
pub const DONE: &str = "done";

/// A typed, JSON-bearing unit delivered to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Map<String, Value>,
}

/// Classification of [`ChatEvent::event_type`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ContentDelta,
    Content,
    ToolCall,
    ToolResult,
    ToolConfirm,
    Session,
    Usage,
    Error,
    Done,
    Other(String),
}

impl EventKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            CONTENT_DELTA => EventKind::ContentDelta,
            CONTENT => EventKind::Content,
            TOOL_CALL => EventKind::ToolCall,
            TOOL_RESULT => EventKind::ToolResult,
            TOOL_CONFIRM => EventKind::ToolConfirm,
            SESSION => EventKind::Session,
            USAGE => EventKind::Usage,
            ERROR => EventKind::Error,
            DONE => EventKind::Done,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl ChatEvent {
    pub fn new(event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_name(&self.event_type)
    }

    pub fn is_done(&self) -> bool {
        self.event_type == DONE
    }

    /// String field of the data mapping.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Incremental text of a `content_delta` event.
    pub fn delta(&self) -> Option<&str> {
        self.str_field("delta")
    }

    /// Full text of a `content` event.
    pub fn text(&self) -> Option<&str> {
        self.str_field("text")
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Tool arguments as sent by the server (usually a JSON-encoded string).
    pub fn tool_arguments(&self) -> Option<&Value> {
        self.data.get("arguments")
    }

    pub fn tool_result(&self) -> Option<&Value> {
        self.data.get("result")
    }

    /// Conversation identifier carried by a `done` event.
    ///
    /// An empty string counts as absent.
    pub fn conversation_id(&self) -> Option<&str> {
        self.str_field("conversation_id").filter(|id| !id.is_empty())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.str_field("session_id").filter(|id| !id.is_empty())
    }

    /// Error text of an `error` event (`error` or `message` field).
    pub fn error_message(&self) -> Option<&str> {
        self.str_field("error").or_else(|| self.str_field("message"))
    }
}

/// Why a frame could not become an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeError {
    InvalidJson { event_type: String, message: String },
    NotAnObject { event_type: String },
}

impl std::fmt::Display for MaterializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterializeError::InvalidJson {
                event_type,
                message,
            } => write!(f, "Invalid JSON for event '{}': {}", event_type, message),
            MaterializeError::NotAnObject { event_type } => {
                write!(f, "Data for event '{}' is not a JSON object", event_type)
            }
        }
    }
}

impl std::error::Error for MaterializeError {}

/// Parse a frame's data as a JSON object.
pub fn try_materialize(frame: &Frame) -> Result<ChatEvent, MaterializeError> {
    match serde_json::from_str::<Value>(&frame.data) {
        Ok(Value::Object(data)) => Ok(ChatEvent::new(frame.event.clone(), data)),
        Ok(_) => Err(MaterializeError::NotAnObject {
            event_type: frame.event.clone(),
        }),
        Err(e) => Err(MaterializeError::InvalidJson {
            event_type: frame.event.clone(),
            message: e.to_string(),
        }),
    }
}

/// Best-effort materialization: malformed frames are dropped.
pub fn materialize(frame: &Frame) -> Option<ChatEvent> {
    match try_materialize(frame) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::debug!(event_type = %frame.event, "Dropping SSE frame: {}", err);
            None
        }
    }
}
