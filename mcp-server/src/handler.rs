use crate::config::McpServerConfig;
use crate::resource::{JobResourceUri, DETAILS_URI_TEMPLATE, TODAY_URI, VIEWS_URI_TEMPLATE};
use crate::types::{
    CreateJobListingParams, CreateJobViewParams, FetchJobListingsParams, GetJobViewsParams,
    UpdateJobListingStatusParams,
};
use app::app::job::JobApp;
use app::app::job_view::JobViewApp;
use jobboard_base::error::JobBoardError;
use jobboard_base::{APP_MCP_NAME, APP_VERSION};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Content, Implementation, ListResourceTemplatesResult,
        ListResourcesResult, PaginatedRequestParam, RawResource, ReadResourceRequestParam,
        ReadResourceResult, ResourceContents, ResourceTemplate, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const JSON_MIME_TYPE: &str = "application/json";

/// Where an error is reported: tool calls and resource reads map NotFound differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTarget {
    Tool,
    Resource,
}

/// Convert an app error into an MCP error carrying `{"kind": ...}` data.
pub fn to_mcp_error(e: anyhow::Error, target: ErrorTarget) -> McpError {
    match e.downcast_ref::<JobBoardError>() {
        Some(err) => {
            let data = Some(json!({ "kind": err.kind() }));
            match err {
                JobBoardError::NotFound(_) if target == ErrorTarget::Resource => {
                    McpError::resource_not_found(err.to_string(), data)
                }
                _ if err.is_client_error() => McpError::invalid_params(err.to_string(), data),
                _ => {
                    tracing::error!("request failed: {:?}", e);
                    McpError::internal_error(err.to_string(), data)
                }
            }
        }
        None => {
            tracing::error!("request failed: {:?}", e);
            McpError::internal_error(format!("{e:#}"), Some(json!({ "kind": "Internal" })))
        }
    }
}

fn to_json_text<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(
            format!("JSON serialization failed: {e}"),
            Some(json!({ "kind": "SerdeJsonError" })),
        )
    })
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(to_json_text(
        value,
    )?)]))
}

/// MCP front of the job board: tools and `jobs://` resources over the app layer.
#[derive(Clone)]
pub struct McpHandler {
    job_app: Arc<dyn JobApp + 'static>,
    job_view_app: Arc<dyn JobViewApp + 'static>,
    config: McpServerConfig,
    tool_router: ToolRouter<Self>,
}

impl McpHandler {
    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    /// Storage round trip used by the detailed health check.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.job_app.ping().await
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_sec.max(1))
    }

    async fn run<T, F>(&self, op: &str, target: ErrorTarget, fut: F) -> Result<T, McpError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout(), fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(to_mcp_error(e, target)),
            Err(_) => {
                tracing::warn!("{} timed out ({}s)", op, self.config.request_timeout_sec);
                Err(McpError::internal_error(
                    format!("{op} timed out"),
                    Some(json!({ "kind": "Timeout" })),
                ))
            }
        }
    }

    /// JSON text of a `jobs://` resource.
    pub async fn read_resource_text(&self, uri: &str) -> Result<String, McpError> {
        let resource = JobResourceUri::from_str(uri).map_err(|e| {
            McpError::resource_not_found(e.to_string(), Some(json!({ "kind": e.kind() })))
        })?;
        tracing::debug!("read resource: {:?}", &resource);
        match resource {
            JobResourceUri::Today => {
                let jobs = self
                    .run(uri, ErrorTarget::Resource, self.job_app.find_today_jobs())
                    .await?;
                to_json_text(&jobs)
            }
            JobResourceUri::Details(job_id) => {
                let job = self
                    .run(
                        uri,
                        ErrorTarget::Resource,
                        self.job_app.find_job_detail(&job_id),
                    )
                    .await?;
                to_json_text(&job)
            }
            JobResourceUri::Views(job_id) => {
                let count = self
                    .run(
                        uri,
                        ErrorTarget::Resource,
                        self.job_view_app.count_views(&job_id),
                    )
                    .await?;
                to_json_text(&count)
            }
        }
    }
}

#[tool_router]
impl McpHandler {
    pub fn new(
        job_app: Arc<dyn JobApp + 'static>,
        job_view_app: Arc<dyn JobViewApp + 'static>,
        config: McpServerConfig,
    ) -> Self {
        Self {
            job_app,
            job_view_app,
            config,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search job listings. Filter by job_id, company, location, job_type, connection_type, skills and posted date range (posted_from/posted_to, RFC 3339 or YYYY-MM-DD). Criteria are combined with operator AND (default) or OR. Each listing carries view_count."
    )]
    pub async fn fetch_job_listings(
        &self,
        Parameters(params): Parameters<FetchJobListingsParams>,
    ) -> Result<CallToolResult, McpError> {
        let filter = params.filter.unwrap_or_default();
        let jobs = self
            .run(
                "fetch_job_listings",
                ErrorTarget::Tool,
                self.job_app.find_jobs(&filter),
            )
            .await?;
        json_result(&jobs)
    }

    #[tool(
        description = "Create a job listing. Fails if job_id already exists. created_at/updated_at are set by the server when omitted."
    )]
    pub async fn create_job_listing(
        &self,
        Parameters(params): Parameters<CreateJobListingParams>,
    ) -> Result<CallToolResult, McpError> {
        let job = self
            .run(
                "create_job_listing",
                ErrorTarget::Tool,
                self.job_app.create_job(params.job),
            )
            .await?;
        json_result(&job)
    }

    #[tool(
        description = "Record that a user viewed a job listing. A repeated view by the same user only refreshes its view_date. Returns action (created/updated) and total_job_views."
    )]
    pub async fn create_job_view(
        &self,
        Parameters(params): Parameters<CreateJobViewParams>,
    ) -> Result<CallToolResult, McpError> {
        let recorded = self
            .run(
                "create_job_view",
                ErrorTarget::Tool,
                self.job_view_app
                    .record_view(&params.job_id, &params.user_id),
            )
            .await?;
        json_result(&recorded)
    }

    #[tool(description = "Internal: list raw view records (user_id, view_date) of a job listing.")]
    pub async fn get_job_views(
        &self,
        Parameters(params): Parameters<GetJobViewsParams>,
    ) -> Result<CallToolResult, McpError> {
        if !self.config.internal_tools_enabled {
            return Err(McpError::invalid_request(
                "get_job_views is disabled",
                Some(json!({ "kind": "Disabled" })),
            ));
        }
        let views = self
            .run(
                "get_job_views",
                ErrorTarget::Tool,
                self.job_view_app.find_views(&params.job_id),
            )
            .await?;
        json_result(&views)
    }

    #[tool(description = "Set the status of a job listing to active or closed.")]
    pub async fn update_job_listing_status(
        &self,
        Parameters(params): Parameters<UpdateJobListingStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        let job = self
            .run(
                "update_job_listing_status",
                ErrorTarget::Tool,
                self.job_app.update_job_status(&params.job_id, params.status),
            )
            .await?;
        json_result(&job)
    }
}

#[tool_handler]
impl ServerHandler for McpHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "jobboard MCP Server: job listings with view analytics.\n\n\
                 Tools:\n\
                 1. fetch_job_listings - search listings (AND/OR filter)\n\
                 2. create_job_listing - add a listing\n\
                 3. create_job_view - record a user's view of a listing\n\
                 4. get_job_views - raw view records (internal)\n\
                 5. update_job_listing_status - open or close a listing\n\n\
                 Resources: jobs://today, jobs://details/{job_id}, jobs://views/{job_id}"
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: APP_MCP_NAME.to_string(),
                version: APP_VERSION.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let today = RawResource {
            description: Some("Open job listings posted today (UTC)".to_string()),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
            ..RawResource::new(TODAY_URI, "today_jobs")
        };
        Ok(ListResourcesResult::with_all_items(vec![
            today.no_annotation()
        ]))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = serde_json::from_value::<Vec<ResourceTemplate>>(json!([
            {
                "uriTemplate": DETAILS_URI_TEMPLATE,
                "name": "job_details",
                "description": "A job listing with its view_count",
                "mimeType": JSON_MIME_TYPE
            },
            {
                "uriTemplate": VIEWS_URI_TEMPLATE,
                "name": "job_view_count",
                "description": "Number of distinct viewers of a job listing",
                "mimeType": JSON_MIME_TYPE
            }
        ]))
        .map_err(|e| McpError::internal_error(format!("invalid resource template: {e}"), None))?;
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let text = self.read_resource_text(&request.uri).await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let e = to_mcp_error(
            JobBoardError::NotFound("job".to_string()).into(),
            ErrorTarget::Resource,
        );
        assert_eq!(e.code, rmcp::model::ErrorCode::RESOURCE_NOT_FOUND);
        assert_eq!(e.data, Some(json!({"kind": "NotFound"})));

        let e = to_mcp_error(
            JobBoardError::NotFound("job".to_string()).into(),
            ErrorTarget::Tool,
        );
        assert_eq!(e.code, rmcp::model::ErrorCode::INVALID_PARAMS);

        let e = to_mcp_error(
            JobBoardError::DuplicateKey("job".to_string()).into(),
            ErrorTarget::Tool,
        );
        assert_eq!(e.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert_eq!(e.data, Some(json!({"kind": "DuplicateKey"})));

        let e = to_mcp_error(
            JobBoardError::StorageUnavailable("down".to_string()).into(),
            ErrorTarget::Tool,
        );
        assert_eq!(e.code, rmcp::model::ErrorCode::INTERNAL_ERROR);

        let e = to_mcp_error(anyhow::anyhow!("boom"), ErrorTarget::Tool);
        assert_eq!(e.data, Some(json!({"kind": "Internal"})));
    }
}
