pub mod error;

pub static APP_NAME: &str = "jobboard";
pub static APP_MCP_NAME: &str = "jobboard-mcp";
pub static APP_VERSION: &str = env!("CARGO_PKG_VERSION");
