//! MCP Client using the official rmcp SDK

use async_trait::async_trait;
use parking_lot::Mutex;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation, RawContent, Tool},
    service::{Peer, RunningService},
    transport::{
        ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess,
        streamable_http_client::StreamableHttpClientTransportConfig,
    },
    RoleClient,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use crate::logging::SharedLogger;
use crate::sources::SourceConnection;
use crate::tools::{ToolInvoker, ToolOutput};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection already closed")]
    AlreadyClosed,
}

pub type McpResult<T> = Result<T, McpError>;

/// Client connection to one MCP server
///
/// Calls go through a cloned `Peer`; the running service itself is kept
/// aside so that `close` can take it exactly once.
pub struct McpClient {
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
    /// What we connected to, for log lines
    target: String,
    logger: SharedLogger,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "mcp-tools".to_string(),
            title: Some("MCP Tools".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    ///
    /// `bearer_token` is sent as `Authorization: Bearer <token>`.
    pub async fn connect_http(
        url: &str,
        bearer_token: Option<&str>,
        logger: SharedLogger,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let mut config = StreamableHttpClientTransportConfig::with_uri(url.to_string());
        if let Some(token) = bearer_token {
            config = config.auth_header(token.to_string());
        }
        let transport = StreamableHttpClientTransport::from_config(config);

        let service = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self::from_service(service, url.to_string(), logger))
    }

    /// Spawn `command` and speak MCP over its stdin/stdout
    ///
    /// `envs` are added to the child's environment on top of the inherited one.
    pub async fn connect_stdio(
        command: &str,
        args: &[String],
        envs: &[(String, String)],
        logger: SharedLogger,
    ) -> McpResult<Self> {
        let target = std::iter::once(command)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        logger.info(&format!("[McpClient] Spawning stdio server: {}", target));

        let transport = TokioChildProcess::new(Command::new(command).configure(|cmd| {
            cmd.args(args);
            for (key, value) in envs {
                cmd.env(key, value);
            }
        }))
        .map_err(|e| McpError::ConnectionFailed(format!("failed to spawn `{}`: {}", command, e)))?;

        let service = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self::from_service(service, target, logger))
    }

    fn from_service(
        service: RunningService<RoleClient, ClientInfo>,
        target: String,
        logger: SharedLogger,
    ) -> Self {
        Self {
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
            target,
            logger,
        }
    }

    /// List all available tools, following pagination
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let tools = self
            .peer
            .list_all_tools()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] Listed {} tools from {}",
            tools.len(),
            self.target
        ));

        Ok(tools)
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.logger.debug(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        self.peer
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.peer.peer_info().map(|info| &info.server_info)
    }

    /// Whether `close` has already run
    pub fn is_closed(&self) -> bool {
        self.service.lock().is_none()
    }

    /// Close the connection
    ///
    /// Only the first call does anything; later calls return `McpError::AlreadyClosed`.
    pub async fn close(&self) -> McpResult<()> {
        let service = self.service.lock().take().ok_or(McpError::AlreadyClosed)?;

        self.logger.info(&format!("[McpClient] Closing connection to {}", self.target));
        service
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("target", &self.target)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Flatten the text parts of a tool result
pub fn tool_output_from_result(result: CallToolResult) -> ToolOutput {
    let content = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    ToolOutput {
        content,
        is_error: result.is_error.unwrap_or(false),
    }
}

#[async_trait]
impl ToolInvoker for McpClient {
    async fn invoke(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        self.call_tool(name, arguments).await.map(tool_output_from_result)
    }
}

#[async_trait]
impl SourceConnection for McpClient {
    async fn close(&self) -> McpResult<()> {
        McpClient::close(self).await
    }
}
