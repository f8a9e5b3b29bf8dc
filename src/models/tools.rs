use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool exposed to the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON schema of the tool's parameters
    #[serde(default)]
    pub parameters: Option<Value>,
}

/// Tools grouped by the target they were generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSource {
    pub name: String,
    #[serde(default)]
    pub tools: Vec<ToolSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Per-conversation tool selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub enabled_sources: Vec<String>,
    #[serde(default)]
    pub disabled_tools: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_config_defaults() {
        let config: ToolConfig = serde_json::from_str("{}").unwrap();
        assert!(config.enabled_sources.is_empty());
        assert!(config.disabled_tools.is_empty());
    }

    #[test]
    fn test_tool_source_deserialize() {
        let source: ToolSource = serde_json::from_str(
            r#"{"name":"github","tools":[{"name":"github__list","description":"List"}]}"#,
        )
        .unwrap();
        assert_eq!(source.tools.len(), 1);
        assert_eq!(source.tools[0].name, "github__list");
    }
}
