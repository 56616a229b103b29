//! Completion-level enums.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Why the model stopped generating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    FunctionCall,
    /// Provider-specific reason not known to this crate.
    #[strum(default)]
    Other(String),
}

impl FinishReason {
    /// Parse a wire value; unknown values are preserved, never rejected.
    pub fn parse(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| Self::Other(value.to_string()))
    }

    pub fn is_tool_calls(&self) -> bool {
        matches!(self, Self::ToolCalls)
    }
}
