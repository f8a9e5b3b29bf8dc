use serde::{Deserialize, Serialize};

/// A configured API target as listed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub spec: String,
    #[serde(default)]
    pub auth_type: String,
    #[serde(default)]
    pub auth_header_name: String,
    #[serde(default)]
    pub has_token: bool,
    #[serde(default)]
    pub description: String,
    /// Number of tools generated from the target
    #[serde(default, rename = "tools")]
    pub tool_count: usize,
}

/// Registration payload for a new target. Credentials are passed through
/// to the server untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTarget {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    /// OpenAPI spec URL or path
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spec: String,
    /// Tool set file path
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tools: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_header_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl NewTarget {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = spec.into();
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth_type = "bearer".to_string();
        self.auth_token = token.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Response to adding or removing a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetChange {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Total tools loaded after the change
    #[serde(default)]
    pub tools: usize,
}

/// Result of probing a base URL for an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub found: bool,
    #[serde(default)]
    pub spec_url: Option<String>,
    #[serde(default)]
    pub tools_path: Option<String>,
    #[serde(default, rename = "tools")]
    pub tool_count: usize,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub auth_type: Option<String>,
    #[serde(default)]
    pub auth_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
