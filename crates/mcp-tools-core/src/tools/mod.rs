//! Merged tool namespace handed to the completion workflow
//!
//! - `ToolSet`: name -> `ToolEntry` across every activated source
//! - `ToolEntry`: the `Tool` definition plus whoever can run it
//! - `ToolInvoker`: the seam between an entry and its live connection
//!
//! ```rust,ignore
//! let activated = manager.activate_all(None).await;
//!
//! // Definitions for the completion request
//! let tools = activated.tools.definitions();
//!
//! // Execute tool calls from the model's response
//! let results = activated.tools.execute_tool_calls(&tool_calls).await;
//! ```

mod toolset;

pub use toolset::{ToolEntry, ToolInvoker, ToolOutput, ToolSet};
