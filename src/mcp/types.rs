use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents an MCP tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub(crate) fn to_rmcp(&self) -> rmcp::model::Tool {
        rmcp::model::Tool {
            name: self.name.clone().into(),
            title: None,
            description: self.description.clone().map(Into::into),
            input_schema: std::sync::Arc::new(
                self.input_schema.as_object().cloned().unwrap_or_default(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }
}

/// Request to call an MCP tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
