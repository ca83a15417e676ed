//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition handed to a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Reduce a server's tool to `{name, description, inputSchema}`
///
/// That is all a completion request carries. The server's `title`,
/// `annotations`, `outputSchema` and icons are dropped.
impl From<rmcp::model::Tool> for Tool {
    fn from(tool: rmcp::model::Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|s| s.to_string()).unwrap_or_default(),
            // input_schema is Arc<JsonObject>
            input_schema: Some(Value::Object(tool.input_schema.as_ref().clone())),
        }
    }
}

/// Tool call issued by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    pub input: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Get an input argument as a string
    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }
}

/// Tool result to send back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is responding to
    #[serde(rename = "callId")]
    pub call_id: String,
    /// The result content
    pub content: String,
    /// Whether this result represents an error
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: error.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_serializes_with_camel_case_schema() {
        let tool = Tool::new("resolve-library-id", "Resolve a package name")
            .with_schema(json!({
                "type": "object",
                "properties": { "libraryName": { "type": "string" } },
                "required": ["libraryName"]
            }));

        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["name"], "resolve-library-id");
        assert_eq!(value["inputSchema"]["required"][0], "libraryName");

        let bare = serde_json::to_value(Tool::new("ping", "")).unwrap();
        assert!(bare.get("inputSchema").is_none());
    }

    #[test]
    fn test_tool_from_mcp_tool() {
        let schema = json!({ "type": "object", "properties": {} });
        let mcp: rmcp::model::Tool = serde_json::from_value(json!({
            "name": "get-library-docs",
            "description": "Fetch docs",
            "inputSchema": schema,
        }))
        .unwrap();

        let tool = Tool::from(mcp);
        assert_eq!(tool.name, "get-library-docs");
        assert_eq!(tool.description, "Fetch docs");
        assert_eq!(tool.input_schema, Some(schema));
    }

    #[test]
    fn test_tool_from_mcp_drops_display_metadata() {
        let mcp: rmcp::model::Tool = serde_json::from_value(json!({
            "name": "get-library-docs",
            "title": "Get Library Docs",
            "inputSchema": { "type": "object" },
            "outputSchema": { "type": "object" },
            "annotations": { "readOnlyHint": true }
        }))
        .unwrap();

        let value = serde_json::to_value(Tool::from(mcp)).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["description", "inputSchema", "name"]);
        assert_eq!(value["description"], "");
    }

    #[test]
    fn test_tool_call_args() {
        let call = ToolCall::new("call_1", "get-library-docs", json!({ "topic": "routing" }));
        assert_eq!(call.get_arg_str("topic"), Some("routing"));
        assert_eq!(call.get_arg_str("missing"), None);
    }

    #[test]
    fn test_tool_result_error_flag_serialization() {
        let ok = serde_json::to_value(ToolResult::success("c1", "done")).unwrap();
        assert!(ok.get("isError").is_none());
        assert_eq!(ok["callId"], "c1");

        let err = ToolResult::error("c2", "boom");
        assert!(err.is_error);
        assert_eq!(serde_json::to_value(err).unwrap()["isError"], true);
    }
}
