//! Aggregate tool mapping

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::{McpResult, McpTool};
use crate::types::{Tool, ToolCall, ToolResult};

/// Text produced by a tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

/// Something that can run a tool by name
///
/// `McpClient` is the real implementation; every tool from one connection
/// shares the same invoker.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, name: &str, arguments: Value) -> McpResult<ToolOutput>;
}

/// A tool together with the source that provides it
#[derive(Clone)]
pub struct ToolEntry {
    /// Definition as sent to the model
    pub tool: Tool,
    /// Id of the source that exposed it
    pub source: String,
    invoker: Arc<dyn ToolInvoker>,
}

impl ToolEntry {
    pub fn new(tool: Tool, source: impl Into<String>, invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            tool,
            source: source.into(),
            invoker,
        }
    }

    /// Wrap a tool listed by an MCP server
    pub fn from_mcp(tool: McpTool, source: impl Into<String>, invoker: Arc<dyn ToolInvoker>) -> Self {
        Self::new(tool.into(), source, invoker)
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }

    /// Run this tool on its source's connection
    pub async fn invoke(&self, arguments: Value) -> McpResult<ToolOutput> {
        self.invoker.invoke(&self.tool.name, arguments).await
    }
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.tool.name)
            .field("source", &self.source)
            .finish()
    }
}

/// Tools from every activated source, keyed by tool name
///
/// Names are unique: `insert` keeps the entry that arrived first.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    entries: BTreeMap<String, ToolEntry>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the name is taken. Returns whether the entry was added.
    pub fn insert(&mut self, entry: ToolEntry) -> bool {
        if self.entries.contains_key(entry.name()) {
            return false;
        }
        self.entries.insert(entry.name().to_string(), entry);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tool names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolEntry> {
        self.entries.values()
    }

    /// Entries contributed by one source
    pub fn from_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a ToolEntry> + 'a {
        self.entries.values().filter(move |e| e.source == source)
    }

    /// Definitions for the `tools` argument of a completion request
    pub fn definitions(&self) -> Vec<Tool> {
        self.entries.values().map(|e| e.tool.clone()).collect()
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, String> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| format!("Unknown tool: {}", name))?;

        entry
            .invoke(arguments)
            .await
            .map_err(|e| format!("Tool call failed: {}", e))
    }

    /// Execute a tool call from a model response
    pub async fn execute_tool_call(&self, tool_call: &ToolCall) -> ToolResult {
        match self.call_tool(&tool_call.name, tool_call.input.clone()).await {
            Ok(output) => ToolResult {
                call_id: tool_call.id.clone(),
                content: output.content,
                is_error: output.is_error,
            },
            Err(e) => ToolResult::error(tool_call.id.clone(), format!("Error: {}", e)),
        }
    }

    /// Execute several tool calls concurrently; results keep the calls' order
    pub async fn execute_tool_calls(&self, tool_calls: &[ToolCall]) -> Vec<ToolResult> {
        futures::future::join_all(tool_calls.iter().map(|call| self.execute_tool_call(call))).await
    }
}

impl<'a> IntoIterator for &'a ToolSet {
    type Item = &'a ToolEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, ToolEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
