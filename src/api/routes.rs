use crate::api::handlers::ApiState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn health_routes() -> Router<ApiState> {
    Router::new()
        .route("/health", get(super::handlers::health_check))
        .route("/info", get(super::handlers::server_info))
}

/// Plain REST access to the same tools the MCP endpoint serves
pub fn tool_routes() -> Router<ApiState> {
    Router::new()
        .route("/tools", get(super::handlers::list_tools))
        .route("/tools/call", post(super::handlers::call_tool))
}
