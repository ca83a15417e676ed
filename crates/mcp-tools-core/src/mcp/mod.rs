//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to connect to MCP servers over streamable HTTP
//! or over the stdio of a spawned child process.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_tools_core::mcp::McpClient;
//! use mcp_tools_core::logging::NoOpLogger;
//! use std::sync::Arc;
//!
//! let client = McpClient::connect_http(
//!     "https://mcp.context7.com/mcp",
//!     Some("ctx7-key"),
//!     Arc::new(NoOpLogger::new()),
//! ).await?;
//!
//! let tools = client.list_tools().await?;
//! let output = client.call_tool("resolve-library-id", json!({ "libraryName": "tokio" })).await?;
//! client.close().await?;
//! ```

mod client;

pub use client::{McpClient, McpError, McpResult, tool_output_from_result};

// Re-export rmcp types that consumers might need
pub use rmcp::model::{Tool as McpTool, CallToolResult as McpToolResult};
