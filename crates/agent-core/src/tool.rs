//! Tool System
//!
//! Tools are registered at runtime and invoked by the planner. Every tool
//! takes the flat `key=value;key=value` input convention (see
//! [`crate::input`]) and always answers with a [`ToolResult`]: faults inside a
//! tool are reported as a failed result, never propagated.

use async_trait::async_trait;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::input::encode_fields;

/// Tool call request from the planner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    #[serde(rename = "tool", alias = "name")]
    pub name: String,

    /// Raw `key=value;key=value` input
    #[serde(
        rename = "tool_input",
        alias = "arguments",
        default,
        deserialize_with = "deserialize_tool_input"
    )]
    pub input: String,

    /// Optional call ID for tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            id: None,
        }
    }
}

/// Models sometimes emit `tool_input` as an object; fold it into `k=v;k=v`.
fn deserialize_tool_input<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(raw) => Ok(raw),
        serde_json::Value::Object(map) => {
            let pairs: Vec<(String, String)> = map
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect();
            Ok(encode_fields(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))))
        }
        other => Err(D::Error::custom(format!(
            "tool_input must be a string or an object, got {other}"
        ))),
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Field definition for a tool's `key=value` input
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Key as it appears in the input string
    pub name: String,

    /// Expected value shape (string, number, integer)
    #[serde(rename = "type")]
    pub field_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this field is required
    #[serde(default)]
    pub required: bool,
}

impl FieldSchema {
    pub fn required(
        name: impl Into<String>,
        field_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            description: description.into(),
            required: true,
        }
    }
}

/// Tool definition schema (shown to the planner)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Example of the raw input string, e.g. `model=Avanza`
    pub input_format: String,

    /// Field definitions
    pub fields: Vec<FieldSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema
    fn schema(&self) -> ToolSchema;

    /// Execute the tool. Faults are reported through [`ToolResult::failure`].
    async fn execute(&self, call: &ToolCall) -> ToolResult;

    /// Call the tool with a raw input string and return its text answer
    async fn invoke(&self, raw_input: &str) -> String {
        let call = ToolCall::new(self.schema().name, raw_input);
        self.execute(&call).await.output
    }
}

/// Registry for available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let schema = tool.schema();
        self.tools.insert(schema.name, Arc::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tracing::debug!(tool = %call.name, input = %call.input, "Executing tool");
        let mut result = tool.execute(call).await;
        result.id.clone_from(&call.id);
        Ok(result)
    }

    /// Get all tool schemas, ordered by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<_> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Get tool names, ordered
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    pub fn generate_prompt_section(&self) -> String {
        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("To use a tool, respond with a block in exactly this format:\n\n");
        prompt.push_str(
            "```tool\n{\"tool\": \"tool_name\", \"tool_input\": \"key=value;key=value\"}\n```\n\n",
        );
        prompt.push_str(
            "`tool_input` is ONE string of `key=value` pairs separated by `;`. \
             Wait for the tool result before answering.\n\n",
        );

        for schema in self.schemas() {
            prompt.push_str(&format!("### {}\n", schema.name));
            prompt.push_str(&format!("{}\n", schema.description));
            prompt.push_str(&format!("Input format: `{}`\n", schema.input_format));

            if !schema.fields.is_empty() {
                prompt.push_str("**Fields:**\n");
                for field in &schema.fields {
                    let required = if field.required { " (required)" } else { "" };
                    prompt.push_str(&format!(
                        "- `{}` ({}){}: {}\n",
                        field.name, field.field_type, required, field.description
                    ));
                }
            }
            prompt.push('\n');
        }

        prompt
    }
}
