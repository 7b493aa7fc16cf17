//! Argument helpers shared by the MCP and HTTP tool surfaces

use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::mcp::tools::ToolError;

/// Deserialize the whole argument object into a typed request
pub fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T, ToolError> {
    from_value(args.clone())
        .map_err(|e| ToolError::InvalidParams(format!("Invalid arguments: {}", e)))
}

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(args: &Value, key: &str) -> Result<T, ToolError> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        ToolError::InvalidParams(format!("Missing or invalid required argument: '{}'", key))
    })
}
