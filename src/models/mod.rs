//! Flat request/response records exchanged with the server.

mod conversation;
mod request;
mod settings;
mod target;
mod tools;

pub use conversation::{Conversation, Message, ROLE_ASSISTANT, ROLE_TOOL, ROLE_USER};
pub use request::{
    ChatRequest, ConfirmToolRequest, CreateConversationRequest, EditMessageRequest, ProbeRequest,
    RegenerateRequest, StopChatRequest,
};
pub use settings::{
    Ack, FetchModelsRequest, Health, LlmConfig, LlmConfigUpdate, ProviderInfo, ProxyConfig,
    ProxyTestResult, ServerInfo,
};
pub use target::{NewTarget, ProbeResult, TargetChange, TargetInfo};
pub use tools::{Tool, ToolConfig, ToolSource, ToolSummary};
