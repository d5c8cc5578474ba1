//! MCP Server for the job board.
//!
//! Exposes job listings and their view analytics to MCP clients as tools and
//! `jobs://` resources.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MCP Client                              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ MCP Protocol (JSON-RPC)
//!                       │ via Stdio or Streamable HTTP
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 mcp-server crate                             │
//! │  McpHandler (implements rmcp::ServerHandler)                 │
//! │   - tools:     fetch_job_listings, create_job_listing,       │
//! │                create_job_view, get_job_views,               │
//! │                update_job_listing_status                     │
//! │   - resources: jobs://today, jobs://details/{job_id},        │
//! │                jobs://views/{job_id}                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Direct call
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │  app crate: JobApp, JobViewApp                               │
//! └─────────────────────┬───────────────────────────────────────┘
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │  infra crate: JobRepository, JobViewRepository (sqlx)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use mcp_server::{McpHandler, McpServerConfig, boot_streamable_http_server};
//!
//! let handler = McpHandler::new(app_module.job_app.clone(), app_module.job_view_app.clone(), config);
//! boot_streamable_http_server(handler, None).await?;
//! ```
//!
//! ## Environment Variables
//!
//! - `MCP_ADDR`: HTTP server bind address (default: 127.0.0.1:8000)
//! - `MCP_REQUEST_TIMEOUT_SEC`: Request timeout (default: 60)
//! - `MCP_AUTH_ENABLED`: Enable Bearer authentication (default: false)
//! - `MCP_AUTH_TOKENS`: Valid tokens, comma-separated
//! - `MCP_ALLOWED_ORIGINS`: CORS origins, comma-separated (default: none)
//! - `MCP_INTERNAL_TOOLS_ENABLED`: Expose get_job_views (default: true)
//! - `SQLITE_DBNAME` (or `MYSQL_*` with the `mysql` feature): storage

pub mod config;
pub mod handler;
pub mod resource;
pub mod server;
pub mod types;

pub use config::McpServerConfig;
pub use handler::McpHandler;
pub use server::{boot_stdio_server, boot_streamable_http_server};
