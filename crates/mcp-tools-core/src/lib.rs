//! MCP Tools Core
//!
//! Connects to MCP tool servers ("sources"), merges the tools they expose into
//! one name-keyed set, and tears every connection down again at shutdown.
//!
//! ## Activation
//!
//! `ToolsManager` owns the registered sources in priority order. For each one
//! the configuration either disables it, enables it with explicit settings, or
//! leaves it to auto-detection (credentials found in the environment):
//!
//! ```rust,ignore
//! use mcp_tools_core::{ToolsManager, ToolsConfig, ConsoleLogger, ToolCall};
//! use std::sync::Arc;
//!
//! let manager = ToolsManager::with_defaults(Arc::new(ConsoleLogger::new()));
//! let activated = manager.activate_all(Some(&config)).await;
//!
//! // Tool definitions for the model
//! let tools = activated.tools.definitions();
//!
//! // Execute tool calls from a model response
//! let results = activated.tools.execute_tool_calls(&tool_calls).await;
//!
//! activated.close().await?;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod mcp;
pub mod tools;
pub mod sources;
pub mod manager;

// Re-export commonly used types
pub use types::{Tool, ToolCall, ToolResult};

pub use secrets::{SecretStore, EnvSecretStore, MemorySecretStore, ChainSecretStore};

pub use logging::{Logger, LogLevel, SharedLogger, NoOpLogger, ConsoleLogger, MemoryLogger};

pub use config::{
    ConfigProvider, ConfigError, FileConfigProvider, ConfigLevel,
    SourceSetting, SourceSettings, ToolsConfig,
};

pub use tools::{ToolEntry, ToolInvoker, ToolOutput, ToolSet};

pub use sources::{Activation, SourceConnection, SourceError, ToolSource, Context7Source};

pub use manager::{
    ToolsManager, ActivatedTools, CloseHandle, SourceOutcome, SourceState,
    ToolsError, ToolsResult, CloseError,
};

// MCP client using official rmcp SDK
pub use mcp::{McpClient, McpError, McpResult, McpTool, McpToolResult};
