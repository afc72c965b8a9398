pub mod types;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use std::path::Path;
pub use types::*;

/// Prefix for environment overrides, e.g. `NMDC_MCP__QUERY__PAGE_SIZE=200`
pub const ENV_PREFIX: &str = "NMDC_MCP";

/// Load configuration from built-in defaults, an optional TOML file and
/// `NMDC_MCP__*` environment variables, in that order of precedence.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| match path {
            Some(path) => format!("Failed to load config from: {}", path.display()),
            None => "Failed to load config from environment".to_string(),
        })?;

    let app_config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate the loaded configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let upstream = &config.upstream;
    if !upstream.base_url.starts_with("http://") && !upstream.base_url.starts_with("https://") {
        anyhow::bail!(
            "Invalid upstream base_url '{}': must start with http:// or https://",
            upstream.base_url
        );
    }
    if upstream.timeout_secs == 0 {
        anyhow::bail!("upstream.timeout_secs must be greater than 0");
    }
    if upstream.connect_timeout_secs == 0 {
        anyhow::bail!("upstream.connect_timeout_secs must be greater than 0");
    }

    let query = &config.query;
    if !(1..=2000).contains(&query.page_size) {
        anyhow::bail!(
            "query.page_size must be between 1 and 2000, got {}",
            query.page_size
        );
    }
    if !(1..=100).contains(&query.id_batch_size) {
        anyhow::bail!(
            "query.id_batch_size must be between 1 and 100, got {}",
            query.id_batch_size
        );
    }
    if query.max_records_cap == 0 {
        anyhow::bail!("query.max_records_cap must be greater than 0");
    }
    if query.default_max_records == 0 || query.default_max_records > query.max_records_cap {
        anyhow::bail!(
            "query.default_max_records must be between 1 and max_records_cap ({}), got {}",
            query.max_records_cap,
            query.default_max_records
        );
    }
    if query.max_stage_records == 0 {
        anyhow::bail!("query.max_stage_records must be greater than 0");
    }

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        anyhow::bail!(
            "Invalid log level '{}'. Valid levels: {}",
            config.logging.level,
            valid_levels.join(", ")
        );
    }

    // Validate log format
    let valid_formats = ["pretty", "json"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        anyhow::bail!(
            "Invalid log format '{}'. Valid formats: {}",
            config.logging.format,
            valid_formats.join(", ")
        );
    }

    if let Some(filter) = &config.tools {
        let known = crate::mcp::tools::TOOL_NAMES;
        let named = filter
            .include
            .iter()
            .flatten()
            .chain(filter.exclude.iter().flatten());
        for name in named {
            if !known.contains(&name.as_str()) {
                anyhow::bail!(
                    "Unknown tool '{}' in tools filter. Known tools: {}",
                    name,
                    known.join(", ")
                );
            }
        }
    }

    Ok(())
}
