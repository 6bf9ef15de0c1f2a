// animal-talk-core/src/models/tools.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::errors::ToolError;

/// Describes a tool to whoever dispatches to it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParametersDefinition,
}

/// Defines the parameters structure for a tool.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolParametersDefinition {
    #[serde(rename = "type")]
    pub param_type: String,
    pub properties: BTreeMap<String, ToolParameter>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for ToolParametersDefinition {
    fn default() -> Self {
        Self {
            param_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

/// Defines a single parameter within a tool's schema.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

/// Represents the type of a tool parameter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
}

impl ToolDefinition {
    /// JSON schema object for the parameters, as expected by MCP clients.
    pub fn input_schema(&self) -> Map<String, JsonValue> {
        match serde_json::to_value(&self.parameters) {
            Ok(JsonValue::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Arguments supplied to a tool invocation.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ToolInput {
    pub arguments: Map<String, JsonValue>,
}

impl ToolInput {
    pub fn new(arguments: Map<String, JsonValue>) -> Self {
        Self { arguments }
    }

    /// Optional string argument; present but non-string values are an error.
    pub fn optional_str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.arguments.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ToolError::invalid_arguments(format!(
                "'{}' must be a string, got {}",
                key, other
            ))),
        }
    }

    pub fn required_str(&self, key: &str) -> Result<&str, ToolError> {
        self.optional_str(key)?
            .ok_or_else(|| ToolError::invalid_arguments(format!("Missing required argument: {}", key)))
    }
}
