//! One streamed model round: forward text deltas, rebuild tool calls.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{AgentError, Result};
use crate::provider::{ChatModel, ChatRequest, ToolCallDelta};
use crate::types::{AgentEvent, FinishReason, ToolCall};

/// What one round produced, besides the deltas already emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundOutcome {
    /// Last non-null finish reason seen on the stream.
    pub finish_reason: Option<FinishReason>,
    /// Finalized tool calls in ascending stream index order. Only meaningful
    /// when `finish_reason` is `tool_calls`.
    pub tool_calls: Vec<ToolCall>,
}

impl RoundOutcome {
    pub fn wants_tools(&self) -> bool {
        self.finish_reason
            .as_ref()
            .is_some_and(FinishReason::is_tool_calls)
    }
}

#[derive(Debug, Default)]
struct Fragment {
    id: Option<String>,
    name: String,
    arguments: String,
}

/// Rebuilds tool calls from fragments keyed by stream index.
///
/// Ids and names are replaced by the latest non-empty value; argument text is
/// concatenated in arrival order.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    fragments: BTreeMap<usize, Fragment>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: ToolCallDelta) {
        let fragment = self.fragments.entry(delta.index).or_default();
        if let Some(id) = delta.id.filter(|id| !id.is_empty()) {
            fragment.id = Some(id);
        }
        if let Some(name) = delta.name.filter(|name| !name.is_empty()) {
            fragment.name = name;
        }
        if let Some(arguments) = delta.arguments {
            fragment.arguments.push_str(&arguments);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Tool calls in ascending index order. A missing id stays empty here.
    pub fn finish(self) -> Vec<ToolCall> {
        self.fragments
            .into_values()
            .map(|f| ToolCall::new(f.id.unwrap_or_default(), f.name, f.arguments))
            .collect()
    }
}

/// Run one streaming completion.
///
/// Every text delta is sent on `events` as soon as it is decoded. Returns
/// `Canceled` if `cancel` fires and `Timeout` if no chunk arrives within
/// `idle_timeout` (zero disables the bound).
pub async fn run_round(
    model: &dyn ChatModel,
    request: &ChatRequest,
    events: &mpsc::UnboundedSender<AgentEvent>,
    cancel: &CancellationToken,
    idle_timeout: Duration,
) -> Result<RoundOutcome> {
    let mut stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AgentError::Canceled),
        opened = model.stream_chat(request) => opened?,
    };

    let mut finish_reason = None;
    let mut calls = ToolCallAccumulator::new();
    let idle_enabled = !idle_timeout.is_zero();
    let idle = time::sleep(idle_timeout);
    tokio::pin!(idle);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::Canceled),
            _ = &mut idle, if idle_enabled => {
                return Err(AgentError::Timeout(idle_timeout.as_millis() as u64));
            }
            next = stream.next() => next,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk?;
        if idle_enabled {
            idle.as_mut().reset(time::Instant::now() + idle_timeout);
        }

        if let Some(reason) = chunk.finish_reason {
            finish_reason = Some(reason);
        }
        if let Some(text) = chunk.content.filter(|t| !t.is_empty()) {
            let _ = events.send(AgentEvent::delta(text));
        }
        for delta in chunk.tool_calls {
            calls.push(delta);
        }
    }

    debug!(
        finish_reason = ?finish_reason,
        tool_calls = calls.fragments.len(),
        "round stream finished"
    );

    let tool_calls = if finish_reason.as_ref().is_some_and(FinishReason::is_tool_calls) {
        calls.finish()
    } else {
        Vec::new()
    };
    Ok(RoundOutcome {
        finish_reason,
        tool_calls,
    })
}
