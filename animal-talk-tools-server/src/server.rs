// animal-talk-tools-server/src/server.rs
use animal_talk_core::{ToolError, ToolInput, ToolRegistry};
use rmcp::{
    model::*,
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Adapts the tool registry to MCP. Operation failures come back as
/// `is_error` results carrying the rendered message; only protocol-level
/// problems (unknown tool, bad arguments) are MCP errors.
#[derive(Clone)]
pub struct ToolServer {
    registry: Arc<ToolRegistry>,
}

impl ToolServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn mcp_tools(&self) -> Vec<Tool> {
        self.registry
            .definitions()
            .into_iter()
            .map(|def| {
                let schema = def.input_schema();
                Tool::new(def.name, def.description, Arc::new(schema))
            })
            .collect()
    }

    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> Result<CallToolResult, McpError> {
        if !self.registry.contains(name) {
            warn!(tool = %name, "Call for unknown tool");
            return Err(McpError::invalid_params(format!("Unknown tool: {}", name), None));
        }

        let input = ToolInput::new(arguments.unwrap_or_default());
        match self.registry.invoke(name, input).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(ToolError::InvalidArguments(msg)) => Err(McpError::invalid_params(msg, None)),
            Err(e) => {
                info!(tool = %name, kind = ?e.kind(), "Tool reported failure");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "animal-talk-tools-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Animal Talk Tools: list project files, run a project script, convert audio to MP3.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.mcp_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(&request.name, request.arguments).await
    }
}
