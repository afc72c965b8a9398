#![allow(dead_code)]

use axum::Router;
use httpmock::MockServer;
use nmdc_mcp::{
    bridge::QueryBridge,
    config::{AppConfig, ToolFilter, UpstreamConfig},
    mcp::ToolRegistry,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ──────────────────────────────────────────────
// Configs
// ──────────────────────────────────────────────

/// Config pointing the upstream client at a mock NMDC API.
pub fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        upstream: UpstreamConfig {
            base_url: server.base_url(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Config whose upstream is never contacted by the test.
pub fn create_offline_config() -> AppConfig {
    AppConfig {
        upstream: UpstreamConfig {
            base_url: "http://127.0.0.1:19876".to_string(),
            timeout_secs: 1,
            connect_timeout_secs: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn with_exclude(mut config: AppConfig, tools: &[&str]) -> AppConfig {
    config.tools = Some(ToolFilter {
        include: None,
        exclude: Some(tools.iter().map(|t| t.to_string()).collect()),
    });
    config
}

// ──────────────────────────────────────────────
// Shared helpers
// ──────────────────────────────────────────────

pub fn build_registry(config: &AppConfig) -> Arc<ToolRegistry> {
    let bridge = QueryBridge::from_config(config).unwrap();
    Arc::new(ToolRegistry::new(bridge, config.tools.clone()))
}

/// Build the full HTTP router (no listener, driven with tower::oneshot).
pub fn build_test_app(config: &AppConfig) -> Router {
    nmdc_mcp::api::build_router(build_registry(config), CancellationToken::new())
}

/// Helper to extract JSON from a response body.
pub async fn response_json(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Raw response body, for byte-level comparisons.
pub async fn response_bytes(response: axum::http::Response<axum::body::Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// POST /tools/call request for `name` with `arguments`.
pub fn tool_call(name: &str, arguments: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri("/tools/call")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            serde_json::json!({"name": name, "arguments": arguments}).to_string(),
        ))
        .unwrap()
}
