//! OpenAI Chat Completions streaming client.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::config::{AgentConfig, DEFAULT_CONNECT_TIMEOUT};
use crate::error::{AgentError, Result};
use crate::types::FinishReason;

use super::http::{bearer_headers, build_client, parse_sse_line, status_to_error, SseLine};
use super::{ChatChunk, ChatModel, ChatRequest, ChatStream, ToolCallDelta};

pub struct OpenAiChatModel {
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiChatModel {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: build_client(DEFAULT_CONNECT_TIMEOUT)?,
        })
    }

    /// Build a client from configuration; fails when no API key is configured.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Ok(Self {
            model: config.model.clone(),
            api_key: api_key.to_string(),
            base_url: config.base_url.clone(),
            client: build_client(config.connect_timeout)?,
        })
    }

    fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "stream": true,
        });
        if !request.tools.is_empty() {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("tools".into(), request.tools.clone().into());
                obj.insert("tool_choice".into(), "auto".into());
            }
        }
        body
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatStream> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, messages = request.messages.len(), "OpenAI stream_chat");

        let resp = self
            .client
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut lines = LineBuffer::default();
            futures::pin_mut!(byte_stream);

            'outer: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(AgentError::Network(e));
                        break;
                    }
                };
                lines.push(&chunk);

                while let Some(line) = lines.next_line() {
                    match parse_sse_line(&line) {
                        SseLine::Skip => continue,
                        SseLine::Done => break 'outer,
                        SseLine::Data(payload) => match decode_chunk(payload) {
                            Ok(Some(chunk)) => yield Ok(chunk),
                            Ok(None) => {}
                            Err(e) => {
                                yield Err(e);
                                break 'outer;
                            }
                        },
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Accumulates raw bytes and releases complete lines.
///
/// Splitting happens on bytes so a multi-byte character cut across two
/// network chunks is reassembled before decoding.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Decode one `data:` payload.
///
/// Returns `Ok(None)` for payloads that carry nothing for the loop (no
/// choices, or JSON the client does not understand). An upstream error
/// object ends the stream with [`AgentError::Stream`].
pub fn decode_chunk(payload: &str) -> Result<Option<ChatChunk>> {
    let Ok(parsed) = serde_json::from_str::<OpenAiStreamChunk>(payload) else {
        return Ok(None);
    };
    if let Some(error) = parsed.error {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AgentError::Stream(message));
    }
    let Some(choice) = parsed.choices.into_iter().next() else {
        return Ok(None);
    };

    let tool_calls = choice
        .delta
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            let (name, arguments) = match tc.function {
                Some(f) => (f.name, f.arguments),
                None => (None, None),
            };
            ToolCallDelta {
                index: tc.index,
                id: tc.id,
                name,
                arguments,
            }
        })
        .collect();

    Ok(Some(ChatChunk {
        content: choice.delta.content,
        tool_calls,
        finish_reason: choice
            .finish_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(FinishReason::parse),
    }))
}

// OpenAI API stream types (internal)

#[derive(Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiStreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OpenAiStreamChoice {
    #[serde(default)]
    delta: OpenAiStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct OpenAiStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCallChunk>>,
}

#[derive(Deserialize)]
struct OpenAiToolCallChunk {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<OpenAiFunctionChunk>,
}

#[derive(Deserialize)]
struct OpenAiFunctionChunk {
    name: Option<String>,
    arguments: Option<String>,
}
