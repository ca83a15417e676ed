//! Activation and teardown of every known tool source
//!
//! ```rust,ignore
//! use mcp_tools_core::{ToolsManager, ToolsConfig, ConsoleLogger};
//! use std::sync::Arc;
//!
//! let manager = ToolsManager::with_defaults(Arc::new(ConsoleLogger::new()));
//! let activated = manager.activate_all(Some(&ToolsConfig::new().disable("context7"))).await;
//!
//! println!("enabled: {:?}", activated.enabled_sources);
//! let definitions = activated.tools.definitions();
//!
//! // Exactly once, at shutdown
//! activated.close().await?;
//! ```

mod error;
mod close;
mod tools_manager;

pub use error::{CloseError, ToolsError, ToolsResult};
pub use close::CloseHandle;
pub use tools_manager::{
    ActivatedTools, SourceOutcome, SourceState, ToolsManager, DEFAULT_ACTIVATION_TIMEOUT,
};
