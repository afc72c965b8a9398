// Streamable HTTP service serving the MCP protocol at /mcp

use crate::mcp::{NmdcServer, ToolRegistry};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Create the MCP service. Every session gets its own `NmdcServer` handle
/// over the shared registry.
pub fn create_mcp_service(
    registry: Arc<ToolRegistry>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<NmdcServer, LocalSessionManager> {
    let service_factory = move || Ok(NmdcServer::new(registry.clone()));

    StreamableHttpService::new(
        service_factory,
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
            cancellation_token,
        },
    )
}
