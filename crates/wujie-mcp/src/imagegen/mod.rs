pub mod errors;
pub mod format;
pub mod gateway;
pub mod reconcile;
pub mod service;
pub mod status;
pub mod submit;
pub mod types;

use indoc::indoc;
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::Deserialize;

pub use errors::{ErrorKind, ImageGenError};
pub use gateway::{TaskGateway, WujieClient};
pub use service::ImageService;
pub use submit::GenerateImageParams;

pub const SERVER_NAME: &str = "wujie-ai-server";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryTaskParams {
    /// Task key returned when the task was created.
    pub key: String,
}

/// MCP server exposing the image generation tools.
#[derive(Clone)]
pub struct ImageGenServer {
    service: ImageService,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ImageGenServer {
    pub fn new(service: ImageService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Generate an image from a text prompt. Submits the task and waits until the image is ready, then returns its URL and the credits consumed."
    )]
    async fn generate_image(
        &self,
        Parameters(params): Parameters<GenerateImageParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.service.generate(params, context.ct.clone()).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Check the current status of an image generation task without waiting.")]
    async fn query_generate_task(
        &self,
        Parameters(params): Parameters<QueryTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.service.query(&params.key).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List the available image models as a table of model_code and model_desc.")]
    async fn query_model_infos(&self) -> Result<CallToolResult, McpError> {
        let text = self.service.list_models().await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

impl ServerHandler for ImageGenServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                indoc! {r#"
                Image generation backed by the Wujie AI open platform.

                - generate_image: submit a prompt and wait for the finished image.
                - query_generate_task: snapshot the status of a task by its key.
                - query_model_infos: list model codes usable in generate_image.
            "#}
                .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        }))
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            if !self.tool_router.has_route(request.name.as_ref()) {
                tracing::warn!(tool = %request.name, "call to unknown tool");
                return Err(ImageGenError::MethodNotFound(request.name.to_string()).into());
            }
            let tool = request.name.to_string();
            let result = self
                .tool_router
                .call(ToolCallContext::new(self, request, context))
                .await;
            if let Err(e) = &result {
                tracing::error!(%tool, code = e.code.0, message = %e.message, "tool call failed");
            }
            result
        }
    }
}
