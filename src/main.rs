use anyhow::{Context, Result};
use clap::Parser;
use nmdc_mcp::{api, config};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nmdc-mcp")]
#[command(about = "MCP server for querying the NMDC database", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "NMDC_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Transport to serve on (stdio, http)
    #[arg(short, long)]
    transport: Option<config::TransportKind>,

    /// Override the HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Override log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // reqwest is built on rustls; pick the provider before any TLS handshake
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from: {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(transport) = cli.transport {
        config.server.transport = transport;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(log_level) = cli.log_level {
        config.logging.level = log_level;
    }
    if let Some(log_format) = cli.log_format {
        config.logging.format = log_format;
    }
    config::validate_config(&config)?;

    init_logging(&config.logging)?;
    log_startup(&config);

    api::serve(config).await
}

/// Logs go to stderr: stdout carries the MCP stream in stdio mode.
fn init_logging(config: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

fn log_startup(config: &config::AppConfig) {
    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("  → Upstream: {}", config.upstream.base_url);
    info!("  → Transport: {}", config.server.transport);
    if config.server.transport == config::TransportKind::Http {
        info!("  → Address: {}:{}", config.server.host, config.server.port);
    }
    info!(
        "  → Records: default {}, cap {}, page size {}",
        config.query.default_max_records, config.query.max_records_cap, config.query.page_size
    );
    if let Some(filter) = &config.tools {
        info!(
            "  → Tool filter: include={:?} exclude={:?}",
            filter.include, filter.exclude
        );
    }
}
