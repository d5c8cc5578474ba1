use crate::config::McpServerConfig;
use crate::handler::McpHandler;
use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use command_utils::util::datetime;
use jobboard_base::{APP_MCP_NAME, APP_VERSION};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>jobboard MCP Server</title></head>
<body>
    <h1>jobboard MCP Server</h1>
    <p>MCP endpoint: <code>POST /mcp</code></p>
    <p>Health check: <code>GET /api/health</code>, <code>GET /api/health/detailed</code></p>
    <p>Resources: <code>jobs://today</code>, <code>jobs://details/{job_id}</code>, <code>jobs://views/{job_id}</code></p>
</body>
</html>"#;

const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// Token store for Bearer authentication.
///
/// NOTE: plain comparison against configured tokens; run behind TLS.
pub struct TokenStore {
    enabled: bool,
    valid_tokens: Vec<String>,
}

impl TokenStore {
    pub fn new(enabled: bool, tokens: Vec<String>) -> Self {
        Self {
            enabled,
            valid_tokens: tokens,
        }
    }

    pub fn from_config(config: &McpServerConfig) -> Self {
        if config.auth_enabled && config.auth_tokens.is_empty() {
            tracing::warn!("MCP auth enabled without tokens: every /mcp request is rejected");
        }
        Self::new(config.auth_enabled, config.auth_tokens.clone())
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.valid_tokens.iter().any(|t| t == token)
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(String::from))
}

async fn auth_middleware(
    State(token_store): State<Arc<TokenStore>>,
    headers: HeaderMap,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if !token_store.enabled {
        return Ok(next.run(request).await);
    }

    match extract_bearer_token(&headers) {
        Some(token) if token_store.is_valid(&token) => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// CORS for the configured origins. None when no origin is configured.
pub fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| {
            HeaderValue::from_str(o.trim())
                .inspect_err(|e| tracing::warn!("ignore invalid CORS origin {}: {:?}", o, e))
                .ok()
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers([HeaderName::from_static(MCP_SESSION_ID_HEADER)]),
    )
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn detailed_health_check(State(handler): State<McpHandler>) -> Response {
    let (status, storage) = match handler.ping().await {
        Ok(()) => (StatusCode::OK, "ok".to_string()),
        Err(e) => {
            tracing::error!("storage health check failed: {:?}", e);
            (StatusCode::SERVICE_UNAVAILABLE, format!("{e}"))
        }
    };
    let body = json!({
        "status": if status == StatusCode::OK { "healthy" } else { "unhealthy" },
        "service": APP_MCP_NAME,
        "version": APP_VERSION,
        "timestamp": datetime::now().to_rfc3339(),
        "storage": storage,
    });
    (status, Json(body)).into_response()
}

/// Router serving MCP at /mcp, health checks under /api and the index page.
pub fn create_router(handler: McpHandler) -> Router {
    let config = handler.config().clone();
    let token_store = Arc::new(TokenStore::from_config(&config));

    // NOTE: stateful_mode=false; LocalSessionManager closes SSE channels right after
    // the response in stateful mode (rust-sdk issues 559, 572).
    let service_config = StreamableHttpServerConfig {
        stateful_mode: false,
        ..Default::default()
    };
    let factory_handler = handler.clone();
    let mcp_service: StreamableHttpService<McpHandler, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(factory_handler.clone()),
            LocalSessionManager::default().into(),
            service_config,
        );

    // API routes (public)
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
        .with_state(handler);

    // Protected MCP routes with optional auth middleware
    let protected_mcp = Router::new()
        .nest_service("/mcp", mcp_service)
        .layer(middleware::from_fn_with_state(token_store, auth_middleware));

    let app = Router::new()
        .route("/", get(index))
        .nest("/api", api_routes)
        .merge(protected_mcp);

    match cors_layer(&config.allowed_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Boot the MCP Server with Streamable HTTP transport on `config.addr`.
///
/// Without `shutdown_signal` the server stops on ctrl_c.
pub async fn boot_streamable_http_server(
    handler: McpHandler,
    shutdown_signal: Option<Pin<Box<dyn Future<Output = ()> + Send>>>,
) -> Result<()> {
    let bind_addr = handler.config().addr.clone();
    let app = create_router(handler);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("MCP Streamable HTTP Server started on {}", &bind_addr);

    let shutdown_future: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_signal {
        Some(signal) => signal,
        None => Box::pin(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutting down MCP server..."),
                Err(e) => tracing::error!("failed to listen for ctrl_c: {:?}", e),
            }
        }),
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_future)
        .await?;

    Ok(())
}
