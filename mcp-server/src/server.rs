//! The MCP tool surface: schema-validated wrappers over the resolution
//! chains, served over stdio.

use std::sync::Arc;

use octopus_mcp_core::error::OctopusError;
use octopus_mcp_core::resolution::UrlResolver;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt, schemars, tool, tool_handler, tool_router,
};
use serde::Deserialize;

/// Tool service for one Octopus Deploy instance.
#[derive(Clone)]
pub struct OctopusMcpServer {
    resolver: Arc<UrlResolver>,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UrlRequest {
    #[schemars(
        description = "Full Octopus Deploy URL (e.g. https://your-octopus.app/app#/Spaces-1/tasks/ServerTasks-456)"
    )]
    pub url: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailsRequest {
    #[schemars(description = "Space name (case-sensitive)")]
    pub space_name: String,
    #[schemars(description = "Server task ID (ServerTasks-XXXXX)")]
    pub task_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSpacesRequest {
    #[schemars(description = "Filter spaces by partial name match")]
    pub partial_name: Option<String>,
    #[schemars(description = "Number of items to skip")]
    pub skip: Option<u32>,
    #[schemars(description = "Maximum number of items to return")]
    pub take: Option<u32>,
}

#[tool_router]
impl OctopusMcpServer {
    pub fn new(resolver: Arc<UrlResolver>) -> Self {
        Self {
            resolver,
            tool_router: Self::tool_router(),
        }
    }

    /// Run the service over stdio until the client disconnects.
    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    #[tool(
        description = "Get deployment details from an Octopus Deploy URL. Extracts the deployment ID from the URL and returns deployment information including the task ID needed to view logs.\n\nThis tool handles:\n- Deployment URLs (containing Deployments-XXXXX)\n- Automatic space ID to space name resolution\n- Returns the task ID for easy log access via get_task_details\n\nExample workflow:\n1. Call get_deployment_from_url with the deployment URL\n2. Use the returned taskId to call get_task_details for logs"
    )]
    pub async fn get_deployment_from_url(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.resolver.deployment_from_url(&request.url).await {
            Ok(result) => render_json(&result),
            Err(err) => Ok(tool_error(&err)),
        }
    }

    #[tool(
        description = "Get task details from an Octopus Deploy URL. Returns full task details including execution logs and state.\n\nAccepts task URLs like:\nhttps://your-octopus.app/app#/Spaces-1/tasks/ServerTasks-456\n\nDeployment URLs also work: the deployment record is fetched and its task is resolved automatically.\n\nKey features:\n- Returns full task details including execution logs\n- Handles space ID to space name resolution automatically\n- Validates task ID format"
    )]
    pub async fn get_task_from_url(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.resolver.task_from_url(&request.url).await {
            Ok(result) => render_json(&result),
            Err(err) => Ok(tool_error(&err)),
        }
    }

    #[tool(
        description = "Get detailed information for a specific server task by its ID, including execution logs and state. Requires the space name and a ServerTasks-XXXXX task ID."
    )]
    pub async fn get_task_details(
        &self,
        Parameters(request): Parameters<TaskDetailsRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .resolver
            .task_details(&request.space_name, &request.task_id)
            .await
        {
            Ok(details) => render_json(&details),
            Err(err) => Ok(tool_error(&err)),
        }
    }

    #[tool(
        description = "List spaces on the Octopus Deploy instance. Optionally filter by partial name match. Space names are required by most other tools, so call this early."
    )]
    pub async fn list_spaces(
        &self,
        Parameters(request): Parameters<ListSpacesRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .resolver
            .list_spaces(request.partial_name.as_deref(), request.skip, request.take)
            .await
        {
            Ok(spaces) => render_json(&spaces),
            Err(err) => Ok(tool_error(&err)),
        }
    }
}

#[tool_handler]
impl ServerHandler for OctopusMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Octopus Deploy MCP server. Use get_deployment_from_url or get_task_from_url \
                 when you have a portal URL; they resolve the space and entity identifiers \
                 automatically. Use list_spaces to discover space names and get_task_details \
                 to read execution logs for a known task ID."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

fn render_json<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(err) => Err(McpError::internal_error(
            format!("failed to serialize tool result: {err}"),
            None,
        )),
    }
}

/// Resolution failures are tool errors the model can read and act on, not
/// protocol errors.
fn tool_error(err: &OctopusError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_string())])
}
