use super::args::ToolArguments;
use super::tools::{NmdcTool, register_all_tools};
use super::types::{ToolCallRequest, ToolDefinition};
use crate::bridge::QueryBridge;
use crate::config::ToolFilter;
use crate::error::{NmdcError, Result};
use crate::routing::tool_filter::{apply_tool_filter, is_tool_allowed};
use serde_json::Value;
use tracing::{debug, warn};

/// Maps tool calls to bridge operations, honouring the configured filter.
pub struct ToolRegistry {
    bridge: QueryBridge,
    tools: Vec<Box<dyn NmdcTool>>,
    filter: Option<ToolFilter>,
}

impl ToolRegistry {
    pub fn new(bridge: QueryBridge, filter: Option<ToolFilter>) -> Self {
        Self {
            bridge,
            tools: register_all_tools(),
            filter,
        }
    }

    /// Definitions of the tools this server exposes
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.iter().map(|tool| tool.definition()).collect();
        apply_tool_filter(tools, self.filter.as_ref())
    }

    pub async fn call(&self, request: ToolCallRequest) -> Result<Value> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == request.name)
            .ok_or_else(|| NmdcError::UnknownTool(request.name.clone()))?;

        if !is_tool_allowed(tool.name(), self.filter.as_ref()) {
            warn!("Tool '{}' blocked by filter", request.name);
            return Err(NmdcError::ToolNotAllowed(request.name));
        }

        debug!("Calling tool: {}", request.name);
        let args = ToolArguments::from_value(request.arguments)?;
        let result = tool.execute(&self.bridge, args).await;
        if let Err(e) = &result {
            warn!("Tool '{}' failed ({}): {}", request.name, e.kind(), e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::test_support::settings;
    use crate::error::ErrorKind;
    use crate::upstream::collections::{BIOSAMPLE_SET, STUDY_SET};
    use crate::upstream::memory::MemorySource;
    use serde_json::json;
    use std::sync::Arc;

    fn registry(filter: Option<ToolFilter>) -> ToolRegistry {
        let source = MemorySource::new()
            .with_collection(
                BIOSAMPLE_SET,
                vec![
                    json!({"id": "nmdc:bsm-1", "ecosystem_type": "Soil"}),
                    json!({"id": "nmdc:bsm-2", "ecosystem_type": "Soil"}),
                ],
            )
            .with_collection(STUDY_SET, vec![]);
        ToolRegistry::new(QueryBridge::new(Arc::new(source), settings()), filter)
    }

    #[tokio::test]
    async fn test_call_dispatches_to_bridge() {
        let registry = registry(None);

        let result = registry
            .call(ToolCallRequest::new(
                "find_biosamples_by_ecosystem",
                json!({"ecosystem_type": "Soil", "max_records": 1}),
            ))
            .await
            .unwrap();

        assert_eq!(result["returned_count"], 1);
        assert_eq!(result["more_available"], true);
        assert_eq!(result["records"][0]["id"], "nmdc:bsm-1");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = registry(None);

        let err = registry
            .call(ToolCallRequest::new("drop_database", json!({})))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownTool);
    }

    #[tokio::test]
    async fn test_filter_hides_and_blocks_tools() {
        let registry = registry(Some(ToolFilter {
            include: None,
            exclude: Some(vec!["get_collection_stats".to_string()]),
        }));

        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 10);
        assert!(!names.contains(&"get_collection_stats".to_string()));

        let err = registry
            .call(ToolCallRequest::new("get_collection_stats", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, NmdcError::ToolNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_argument_errors_name_the_argument() {
        let registry = registry(None);

        let err = registry
            .call(ToolCallRequest::new(
                "find_biosamples_by_ecosystem",
                json!({"ecosystem_type": "Soil", "max_records": -1}),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.argument(), Some("max_records"));

        let err = registry
            .call(ToolCallRequest::new(
                "find_biosamples_by_ecosystem",
                json!({"ecosystem_type": "Soil", "limit": 5}),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.argument(), Some("limit"));
    }

    #[tokio::test]
    async fn test_collection_names_tool_shape() {
        let registry = registry(None);

        let result = registry
            .call(ToolCallRequest::new("list_collection_names", Value::Null))
            .await
            .unwrap();

        assert_eq!(result, json!({"count": 2, "collection_names": ["biosample_set", "study_set"]}));
    }
}
