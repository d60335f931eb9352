//! Tool System
//!
//! Declared capabilities the model may call, and the dispatcher that runs
//! them. Dispatch never fails: every outcome, including an unknown tool name
//! or a contract violation, comes back as text for the model to read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Tracing target for dispatch events (the diagnostic log listens here)
pub const LOG_TARGET: &str = "agent_core::tool";

/// Characters of each tool result written to the diagnostic log
const LOGGED_RESULT_CHARS: usize = 500;

/// JSON-Schema object describing a tool's input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSchema {
    /// Always "object"
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Field name -> `{type, description}`
    pub properties: Map<String, Value>,

    pub required: Vec<String>,
}

impl InputSchema {
    /// Empty object schema
    pub fn object() -> Self {
        Self {
            schema_type: "object".into(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Add a required string field
    #[must_use]
    pub fn required(mut self, name: &str, description: &str) -> Self {
        self.insert(name, "string", description);
        self.required.push(name.to_owned());
        self
    }

    /// Add an optional string field
    #[must_use]
    pub fn optional(mut self, name: &str, description: &str) -> Self {
        self.insert(name, "string", description);
        self
    }

    fn insert(&mut self, name: &str, param_type: &str, description: &str) {
        self.properties.insert(
            name.to_owned(),
            json!({ "type": param_type, "description": description }),
        );
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Tool declaration sent to the model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    pub input_schema: InputSchema,
}

/// Contract violations and reported failures inside a tool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' must be a {expected}")]
    InvalidField { field: String, expected: &'static str },

    /// Already phrased for the model; passed through verbatim
    #[error("{0}")]
    Reported(String),
}

impl ToolError {
    /// Text delivered to the model as the tool result
    pub fn render(&self, tool: &str) -> String {
        match self {
            Self::Reported(message) => message.clone(),
            Self::MissingField(_) | Self::InvalidField { .. } => {
                format!("Error executing {tool}: {self}")
            }
        }
    }
}

/// Internal tagged result of a tool run
pub type ToolOutcome = std::result::Result<String, ToolError>;

/// Structured input for a tool call
#[derive(Clone, Debug, Default)]
pub struct ToolInput {
    fields: Map<String, Value>,
}

impl ToolInput {
    /// Anything other than a JSON object is treated as an empty input
    pub fn from_value(value: &Value) -> Self {
        Self {
            fields: value.as_object().cloned().unwrap_or_default(),
        }
    }

    /// String field that must be present
    pub fn required_str(&self, field: &str) -> Result<&str, ToolError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(ToolError::MissingField(field.into())),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ToolError::InvalidField {
                field: field.into(),
                expected: "string",
            }),
        }
    }

    /// String field falling back to `default` when absent
    pub fn optional_str<'a>(&'a self, field: &str, default: &'a str) -> Result<&'a str, ToolError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ToolError::InvalidField {
                field: field.into(),
                expected: "string",
            }),
        }
    }
}

impl From<Value> for ToolInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declaration advertised to the model
    fn declaration(&self) -> ToolDeclaration;

    /// Run the tool; failures are returned, never thrown
    async fn execute(&self, input: &ToolInput) -> ToolOutcome;
}

/// Registry for available tools
///
/// Declarations are captured at registration and emitted in registration
/// order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    declarations: Vec<ToolDeclaration>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool; a tool with the same name is replaced in place
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let declaration = tool.declaration();
        if let Some(&slot) = self.index.get(&declaration.name) {
            self.tools[slot] = tool;
            self.declarations[slot] = declaration;
        } else {
            self.index.insert(declaration.name.clone(), self.tools.len());
            self.tools.push(tool);
            self.declarations.push(declaration);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| Arc::clone(&self.tools[slot]))
    }

    /// Declarations for the model, in registration order
    pub fn declarations(&self) -> &[ToolDeclaration] {
        &self.declarations
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.declarations.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call by name and return the text for the model
    pub async fn invoke(&self, name: &str, input: &Value) -> String {
        tracing::info!(target: LOG_TARGET, tool = %name, input = %input, "Executing tool");

        let result = match self.get(name) {
            None => format!("Unknown tool: {name}"),
            Some(tool) => match tool.execute(&ToolInput::from_value(input)).await {
                Ok(output) => output,
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, tool = %name, error = %err, "Tool failed");
                    err.render(name)
                }
            },
        };

        tracing::info!(
            target: LOG_TARGET,
            tool = %name,
            "Tool result: {}...",
            truncate_chars(&result, LOGGED_RESULT_CHARS)
        );

        result
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices()
        .nth(max)
        .map_or(text, |(idx, _)| &text[..idx])
}
