use anyhow::Result;
use jobboard_base::error::JobBoardError;
use serde::Deserialize;

/// Configuration for MCP Server
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct McpServerConfig {
    /// HTTP server bind address
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Per request timeout in seconds
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
    /// Require a Bearer token on /mcp (HTTP only)
    #[serde(default)]
    pub auth_enabled: bool,
    /// Valid tokens, comma-separated in env
    #[serde(default)]
    pub auth_tokens: Vec<String>,
    /// Origins allowed by CORS, comma-separated in env. Empty disables CORS.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Expose tools returning raw view records (get_job_views)
    #[serde(default = "default_internal_tools_enabled")]
    pub internal_tools_enabled: bool,
}

fn default_addr() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_request_timeout_sec() -> u64 {
    60
}
fn default_internal_tools_enabled() -> bool {
    true
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            request_timeout_sec: default_request_timeout_sec(),
            auth_enabled: false,
            auth_tokens: vec![],
            allowed_origins: vec![],
            internal_tools_enabled: default_internal_tools_enabled(),
        }
    }
}

pub fn load_mcp_server_config_from_env() -> Result<McpServerConfig> {
    McpServerConfig::from_vars(std::env::vars())
}

impl McpServerConfig {
    /// Read configuration from environment variables (MCP_*).
    ///
    /// Unset variables take their defaults, a malformed value is an error.
    pub fn from_env() -> Result<Self> {
        load_mcp_server_config_from_env()
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed("MCP_")
            .from_iter::<_, McpServerConfig>(vars)
            .map_err(|e| {
                JobBoardError::RuntimeError(format!("cannot read mcp server config from env: {e}"))
            })?;
        Ok(config)
    }
}
