//! Chat model trait and the OpenAI chat-completions implementation.

pub mod http;
pub mod openai;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::AgentError;
use crate::types::{ChatMessage, FinishReason};

pub use openai::OpenAiChatModel;

/// One streaming completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Tool schemas, passed to the provider exactly as the registry built them.
    pub tools: Vec<serde_json::Value>,
}

/// One decoded chunk of a streaming completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatChunk {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallDelta>,
    pub finish_reason: Option<FinishReason>,
}

impl ChatChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn finish(reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(reason),
            ..Default::default()
        }
    }

    pub fn tool_call(delta: ToolCallDelta) -> Self {
        Self {
            tool_calls: vec![delta],
            ..Default::default()
        }
    }
}

/// A fragment of a tool call, keyed by its position in the stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallDelta {
    pub index: usize,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: Option<String>,
}

/// Stream of decoded chunks for one completion.
pub type ChatStream = BoxStream<'static, Result<ChatChunk, AgentError>>;

/// Core trait implemented by chat-completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model ID this instance serves.
    fn model_id(&self) -> &str;

    /// Open one streaming completion.
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatStream, AgentError>;
}
