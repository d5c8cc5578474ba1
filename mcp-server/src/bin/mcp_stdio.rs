//! MCP Server with stdio transport.
//!
//! For MCP clients that spawn the server and talk over stdin/stdout:
//! ```json
//! {
//!   "mcpServers": {
//!     "jobboard": {
//!       "command": "/path/to/mcp-stdio",
//!       "env": {
//!         "SQLITE_DBNAME": "/path/to/jobboard.sqlite3",
//!         "LOG_FILE_DIR": "/tmp"
//!       }
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use app::module::AppModule;
use command_utils::util::tracing::LoggingConfig;
use dotenvy::dotenv;
use jobboard_base::APP_NAME;
use mcp_server::{McpHandler, McpServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Stdio mode logs to file only to avoid interfering with MCP protocol
    let conf = command_utils::util::tracing::load_tracing_config_from_env().unwrap_or_default();
    let conf = LoggingConfig {
        file_name: Some(format!("{APP_NAME}.log")),
        use_stdout: false,
        ..conf
    };
    command_utils::util::tracing::tracing_init(conf)?;

    tracing::info!("Starting MCP Stdio Server");

    let app_module = AppModule::new_by_env().await?;
    let mcp_config = McpServerConfig::from_env()?;

    let handler = McpHandler::new(
        app_module.job_app.clone(),
        app_module.job_view_app.clone(),
        mcp_config,
    );

    mcp_server::boot_stdio_server(handler).await?;

    tracing::info!("MCP Stdio Server shutdown");
    Ok(())
}
