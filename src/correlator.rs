//! Per-stream conversation bookkeeping.
//!
//! One [`ConversationCorrelator`] observes every event of a single streaming
//! call. It never reaches the network and holds no shared state, so
//! concurrent calls each get their own.

use serde_json::Value;

use crate::models::Message;
use crate::sse::{ChatEvent, EventKind};

#[derive(Debug, Default)]
pub struct ConversationCorrelator {
    conversation_id: Option<String>,
    session_id: Option<String>,
    transcript: Vec<Message>,
    /// Assistant text still being streamed
    pending_text: Option<String>,
    observed: usize,
}

impl ConversationCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the transcript with the user message that opened the turn.
    pub fn with_user_message(mut self, content: impl Into<String>) -> Self {
        self.transcript.push(Message::user(content));
        self
    }

    pub fn observe(&mut self, event: &ChatEvent) {
        self.observed += 1;

        match event.kind() {
            EventKind::ContentDelta => {
                if let Some(delta) = event.delta() {
                    self.pending_text
                        .get_or_insert_with(String::new)
                        .push_str(delta);
                }
            }
            EventKind::Content => {
                if let Some(text) = event.text() {
                    self.pending_text = Some(text.to_string());
                }
            }
            EventKind::ToolCall => {
                self.flush_assistant();
                let name = event.tool_name().unwrap_or_default();
                let arguments = event.tool_arguments().cloned().unwrap_or(Value::Null);
                self.transcript.push(Message::tool_call(name, arguments));
            }
            EventKind::ToolResult => {
                self.flush_assistant();
                let name = event.tool_name().unwrap_or_default();
                let content = match event.tool_result() {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                self.transcript.push(Message::tool_result(name, content));
            }
            EventKind::Session => {
                if let Some(id) = event.session_id() {
                    self.session_id = Some(id.to_string());
                }
            }
            EventKind::Done => {
                self.flush_assistant();
                // Latest done with an id wins; a done without one keeps it.
                if let Some(id) = event.conversation_id() {
                    if self.conversation_id.as_deref() != Some(id) {
                        tracing::debug!(conversation_id = id, "Conversation id resolved");
                    }
                    self.conversation_id = Some(id.to_string());
                }
            }
            _ => {}
        }
    }

    /// Identifier from a `done` event, if one has arrived.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Events observed so far.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Local transcript so far, without any assistant text still streaming.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Close the turn and return its transcript. Streamed assistant text
    /// that never saw a closing event is kept.
    pub fn into_transcript(mut self) -> Vec<Message> {
        self.flush_assistant();
        self.transcript
    }

    fn flush_assistant(&mut self) {
        if let Some(text) = self.pending_text.take() {
            if !text.is_empty() {
                self.transcript.push(Message::assistant(text));
            }
        }
    }
}
