pub mod handlers;
pub mod mcp_service;
pub mod routes;

use crate::bridge::QueryBridge;
use crate::config::{AppConfig, TransportKind};
use crate::mcp::{NmdcServer, ToolRegistry};
use anyhow::{Context, Result};
use axum::Router;
use handlers::ApiState;
use rmcp::ServiceExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Build the registry from configuration and serve it on the configured transport.
pub async fn serve(config: AppConfig) -> Result<()> {
    let bridge = QueryBridge::from_config(&config).context("Failed to create NMDC client")?;
    let registry = Arc::new(ToolRegistry::new(bridge, config.tools.clone()));

    match config.server.transport {
        TransportKind::Stdio => serve_stdio(registry).await,
        TransportKind::Http => start_server(&config, registry).await,
    }
}

async fn serve_stdio(registry: Arc<ToolRegistry>) -> Result<()> {
    info!("Serving MCP over stdio");

    let service = NmdcServer::new(registry)
        .serve(rmcp::transport::io::stdio())
        .await
        .context("MCP handshake over stdio failed")?;

    let reason = service.waiting().await?;
    info!("MCP session closed: {:?}", reason);
    Ok(())
}

pub async fn start_server(config: &AppConfig, registry: Arc<ToolRegistry>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let ct = CancellationToken::new();

    let app = build_router(registry, ct.child_token());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Server info: http://{}/info", addr);
    info!("MCP endpoint: http://{}/mcp", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(ct))
        .await?;

    Ok(())
}

/// HTTP surface: health and info routes, REST tool routes and the MCP service at `/mcp`.
pub fn build_router(registry: Arc<ToolRegistry>, ct: CancellationToken) -> Router {
    let mcp_service = mcp_service::create_mcp_service(registry.clone(), ct);
    let state = ApiState { registry };

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::tool_routes())
        .nest_service("/mcp", mcp_service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal(ct: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down...");
        },
    }

    // Closes open MCP sessions
    ct.cancel();
}
