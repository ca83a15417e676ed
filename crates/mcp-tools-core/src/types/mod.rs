//! Wire-level tool types shared with the completion workflow

mod tool;

pub use tool::{Tool, ToolCall, ToolResult};
