use serde::{Deserialize, Serialize};

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub tools: usize,
}

impl Health {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `GET /api/info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub tools: usize,
}

/// LLM backend settings as reported by the server (the key comes back masked).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Body of `PUT /api/config/llm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfigUpdate {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

/// Known provider preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub api_base: String,
    #[serde(default)]
    pub models: Vec<String>,
}

/// Body of `POST /api/config/llm/models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchModelsRequest {
    pub api_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub proxy: String,
}

/// Response of `POST /api/config/proxy/test`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyTestResult {
    pub status: String,
}

impl ProxyTestResult {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Generic `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}
