//! Typed access to tool call arguments.

use crate::error::{AgentError, Result};

/// Wrapper around a tool call's decoded JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    value: serde_json::Map<String, serde_json::Value>,
}

impl ToolArguments {
    pub fn new(value: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { value }
    }

    /// Decode the raw arguments text streamed by the model.
    ///
    /// Blank text means "no arguments". Anything that is not a JSON object is
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<serde_json::Value>(trimmed)? {
            serde_json::Value::Object(value) => Ok(Self { value }),
            other => Err(AgentError::InvalidArgument(format!(
                "tool arguments must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn raw(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.value
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// String argument trimmed, with absent or non-string values read as empty.
    pub fn trimmed(&self, key: &str) -> String {
        self.get_str_opt(key).unwrap_or_default().trim().to_string()
    }

    /// Integer argument; numeric strings are accepted, anything else is `None`.
    pub fn get_i64_opt(&self, key: &str) -> Option<i64> {
        match self.value.get(key)? {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
