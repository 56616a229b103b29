//! Events streamed to the client while a run is in progress.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Tool lifecycle marker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolStatus {
    Running,
    Done,
}

/// One event of the outbound stream.
///
/// The serialized form is the frame payload: the variant name becomes the
/// `type` field, so `Delta { text }` encodes as `{"type":"delta","text":..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Delta { text: String },
    ToolStatus { status: ToolStatus, tool: String },
    Error { message: String },
    Done,
}

impl AgentEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta { text: text.into() }
    }

    pub fn tool_status(status: ToolStatus, tool: impl Into<String>) -> Self {
        Self::ToolStatus {
            status,
            tool: tool.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Event kind as written on the frame's `event:` line.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delta { .. } => "delta",
            Self::ToolStatus { .. } => "tool_status",
            Self::Error { .. } => "error",
            Self::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}
