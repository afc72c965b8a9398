use crate::error::NmdcError;
use crate::mcp::{ToolCallRequest, ToolRegistry};
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<ToolRegistry>,
}

pub(crate) async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "nmdc-mcp",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn server_info(State(state): State<ApiState>) -> impl IntoResponse {
    let tools: Vec<String> = state
        .registry
        .definitions()
        .into_iter()
        .map(|tool| tool.name)
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "authors": env!("CARGO_PKG_AUTHORS"),
        "tools": tools,
    }))
}

pub(crate) async fn list_tools(State(state): State<ApiState>) -> impl IntoResponse {
    let tools = state.registry.definitions();
    Json(json!({
        "count": tools.len(),
        "tools": tools,
    }))
}

pub(crate) async fn call_tool(
    State(state): State<ApiState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, NmdcError> {
    let request: ToolCallRequest = serde_json::from_value(payload)
        .map_err(|e| NmdcError::invalid_argument("request", e.to_string()))?;

    info!("REST tool call: {}", request.name);
    let result = state.registry.call(request).await?;
    Ok(Json(result))
}
