// MCP server exposing the NMDC tool registry.
// Tool failures are reported inside the tool result so the calling model can
// read them; only unknown or filtered-out tool names are protocol errors.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ListToolsResult, PaginatedRequestParams,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::registry::ToolRegistry;
use super::types::ToolCallRequest;
use crate::error::NmdcError;

#[derive(Clone)]
pub struct NmdcServer {
    registry: Arc<ToolRegistry>,
}

impl NmdcServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl ServerHandler for NmdcServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(format!(
                "{} v{}: query the National Microbiome Data Collaborative (NMDC) database. \
                 Search biosamples by ecosystem, location, elevation or functional annotation, \
                 find studies with publications and the data files derived from a biosample. \
                 Every result reports returned_count, max_records and more_available.",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        debug!("Listing tools");
        let tools = self
            .registry
            .definitions()
            .iter()
            .map(|definition| definition.to_rmcp())
            .collect();

        Ok(ListToolsResult {
            meta: None,
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let request = ToolCallRequest::new(
            params.name.to_string(),
            Value::Object(params.arguments.unwrap_or_default()),
        );

        match self.registry.call(request).await {
            Ok(result) => Ok(success_result(result)),
            Err(e @ (NmdcError::UnknownTool(_) | NmdcError::ToolNotAllowed(_))) => {
                Err(McpError::invalid_params(e.to_string(), None))
            }
            Err(e) => Ok(error_result(&e)),
        }
    }
}

fn success_result(result: Value) -> CallToolResult {
    CallToolResult {
        meta: None,
        content: vec![Content::text(result.to_string())],
        structured_content: Some(result),
        is_error: Some(false),
    }
}

fn error_result(error: &NmdcError) -> CallToolResult {
    let payload = error.to_payload();
    CallToolResult {
        meta: None,
        content: vec![Content::text(payload.to_string())],
        structured_content: Some(payload),
        is_error: Some(true),
    }
}
