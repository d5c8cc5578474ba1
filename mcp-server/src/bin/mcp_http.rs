//! MCP Server with HTTP transport (Streamable HTTP).
//!
//! # Environment Variables
//!
//! - `MCP_ADDR`: HTTP server bind address (default: 127.0.0.1:8000)
//! - `MCP_AUTH_ENABLED`: Enable Bearer authentication (default: false)
//! - `MCP_AUTH_TOKENS`: Valid tokens, comma-separated
//! - `SQLITE_DBNAME`: database file (default: ./jobboard.sqlite3)
//! - See `McpServerConfig` for additional configuration options.

use anyhow::Result;
use app::module::AppModule;
use command_utils::util::tracing::LoggingConfig;
use dotenvy::dotenv;
use jobboard_base::APP_NAME;
use mcp_server::{McpHandler, McpServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let conf = command_utils::util::tracing::load_tracing_config_from_env().unwrap_or_default();
    let conf = LoggingConfig {
        file_name: Some(format!("{APP_NAME}.log")),
        ..conf
    };
    command_utils::util::tracing::tracing_init(conf)?;

    tracing::info!("Starting MCP HTTP Server");

    let app_module = AppModule::new_by_env().await?;
    let mcp_config = McpServerConfig::from_env()?;

    let handler = McpHandler::new(
        app_module.job_app.clone(),
        app_module.job_view_app.clone(),
        mcp_config,
    );

    mcp_server::boot_streamable_http_server(handler, None).await?;

    tracing::info!("MCP HTTP Server shutdown");
    Ok(())
}
