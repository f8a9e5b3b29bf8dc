use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    /// None starts a new conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }

    pub fn in_conversation(message: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: Some(conversation_id.into()),
        }
    }
}

/// Body of `POST /api/conversations`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateConversationRequest {
    pub title: String,
}

/// Body of `POST /api/targets/probe`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeRequest {
    pub base_url: String,
}

/// Body of `PUT /api/conversations/{id}/messages/{index}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditMessageRequest {
    pub content: String,
}

/// Body of `POST /api/conversations/{id}/regenerate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegenerateRequest {
    pub from_index: usize,
}

/// Body of `POST /api/chat/stop`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopChatRequest {
    pub session_id: String,
}

/// Body of `POST /api/chat/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmToolRequest {
    pub session_id: String,
    pub approved: bool,
}
