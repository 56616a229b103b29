//! Round controller: drives model rounds and tool dispatch for one request.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::{FutureExt, Stream};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use super::round::{run_round, RoundOutcome};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::policy::build_system_prompt;
use crate::provider::{ChatModel, ChatRequest, OpenAiChatModel};
use crate::tools::ToolDispatcher;
use crate::types::{AgentEvent, ChatMessage, ToolCall, ToolStatus};

/// Upper bound on model rounds per request.
pub const MAX_TOOL_ROUNDS: usize = 8;

/// Synthesized id for a tool call the stream never named.
pub fn synthesize_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

/// Fill the fields the chat tool protocol requires on an echoed tool call.
pub fn normalize_tool_call(mut call: ToolCall) -> ToolCall {
    if call.kind.is_empty() {
        call.kind = "function".to_string();
    }
    if call.id.is_empty() {
        call.id = synthesize_call_id();
    }
    if call.function.arguments.trim().is_empty() {
        call.function.arguments = "{}".to_string();
    }
    call
}

/// One client request.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub messages: Vec<ChatMessage>,
    pub locale_hint: Option<String>,
    /// Authenticated caller, passed through to identity-aware tools.
    pub caller: Option<String>,
}

impl RunRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_locale(mut self, locale_hint: impl Into<String>) -> Self {
        self.locale_hint = Some(locale_hint.into());
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

/// Handle for an in-flight run.
///
/// Dropping the handle cancels the run: the model stream is abandoned at its
/// next await point and tool calls that have not started are skipped.
#[derive(Debug)]
pub struct RunHandle {
    events: mpsc::UnboundedReceiver<AgentEvent>,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
}

impl RunHandle {
    /// Next event, or `None` once the run has finished and `done` was read.
    pub async fn next_event(&mut self) -> Option<AgentEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain every event until the stream closes.
    pub async fn collect(mut self) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    /// Events as a stream; dropping the stream cancels the run.
    pub fn into_stream(self) -> impl Stream<Item = AgentEvent> + Send + 'static {
        futures::stream::unfold(self, |mut handle| async move {
            let event = handle.next_event().await?;
            Some((event, handle))
        })
    }
}

/// Sends the terminal `done` event when dropped.
struct DoneGuard {
    events: mpsc::UnboundedSender<AgentEvent>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let _ = self.events.send(AgentEvent::Done);
    }
}

enum ModelSlot {
    Ready(Arc<dyn ChatModel>),
    /// No usable model; runs report this message and stop.
    Unavailable(String),
}

struct RunnerInner {
    model: ModelSlot,
    dispatcher: ToolDispatcher,
}

/// Default agent-loop runner.
#[derive(Clone)]
pub struct LoopRunner {
    inner: Arc<RunnerInner>,
    stream_idle_timeout: Duration,
}

impl LoopRunner {
    /// Runner backed by the OpenAI client described by `config`.
    ///
    /// A missing credential is not an error here; every run reports it instead.
    pub fn new(config: &AgentConfig, dispatcher: ToolDispatcher) -> Self {
        let model = match OpenAiChatModel::from_config(config) {
            Ok(model) => ModelSlot::Ready(Arc::new(model)),
            Err(err) => {
                warn!(error = %err, "chat model unavailable");
                ModelSlot::Unavailable(match err {
                    AgentError::Configuration(message) => message,
                    other => other.to_string(),
                })
            }
        };
        Self::with_slot(model, dispatcher, config.stream_idle_timeout)
    }

    /// Runner over an already constructed model.
    pub fn with_model(model: Arc<dyn ChatModel>, dispatcher: ToolDispatcher) -> Self {
        Self::with_slot(
            ModelSlot::Ready(model),
            dispatcher,
            AgentConfig::default().stream_idle_timeout,
        )
    }

    fn with_slot(model: ModelSlot, dispatcher: ToolDispatcher, stream_idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(RunnerInner { model, dispatcher }),
            stream_idle_timeout,
        }
    }

    /// Bound on the wait for each model chunk; zero disables it.
    pub fn stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.inner.dispatcher
    }

    /// Spawn the loop for one request. Must be called within a tokio runtime.
    pub fn start(&self, request: RunRequest) -> RunHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let inner = Arc::clone(&self.inner);
        let idle_timeout = self.stream_idle_timeout;
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let _done = DoneGuard { events: tx.clone() };

            let model = match &inner.model {
                ModelSlot::Ready(model) => Arc::clone(model),
                ModelSlot::Unavailable(message) => {
                    let _ = tx.send(AgentEvent::error(message.clone()));
                    return;
                }
            };

            info!(
                model = model.model_id(),
                messages = request.messages.len(),
                caller = request.caller.as_deref().unwrap_or("-"),
                "run started"
            );

            let run = drive(&inner, model.as_ref(), request, &tx, &task_cancel, idle_timeout);
            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(Ok(())) => info!("run finished"),
                Ok(Err(AgentError::Canceled)) => info!("run canceled"),
                Ok(Err(err)) => {
                    warn!(error = %err, "run failed");
                    let _ = tx.send(AgentEvent::error(err.event_message()));
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    warn!(%message, "run panicked");
                    let _ = tx.send(AgentEvent::error(format!("Agent error: Panic: {message}")));
                }
            }
        });

        RunHandle {
            events: rx,
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
        }
    }
}

impl std::fmt::Debug for LoopRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let model = match &self.inner.model {
            ModelSlot::Ready(model) => model.model_id().to_string(),
            ModelSlot::Unavailable(reason) => format!("unavailable: {reason}"),
        };
        f.debug_struct("LoopRunner")
            .field("model", &model)
            .field("dispatcher", &self.inner.dispatcher)
            .field("stream_idle_timeout", &self.stream_idle_timeout)
            .finish()
    }
}

async fn drive(
    inner: &RunnerInner,
    model: &dyn ChatModel,
    request: RunRequest,
    events: &mpsc::UnboundedSender<AgentEvent>,
    cancel: &CancellationToken,
    idle_timeout: Duration,
) -> Result<()> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(ChatMessage::system(build_system_prompt(
        request.locale_hint.as_deref(),
    )));
    messages.extend(request.messages);
    let tools = inner.dispatcher.definitions();
    let caller = request.caller.as_deref();

    for round in 0..MAX_TOOL_ROUNDS {
        let chat = ChatRequest {
            messages: messages.clone(),
            tools: tools.clone(),
        };
        let outcome = run_round(model, &chat, events, cancel, idle_timeout).await?;

        debug!(
            round,
            finish_reason = ?outcome.finish_reason,
            tool_calls = outcome.tool_calls.len(),
            "round complete"
        );

        if !outcome.wants_tools() {
            return Ok(());
        }
        let RoundOutcome { tool_calls, .. } = outcome;
        if tool_calls.is_empty() {
            warn!(round, "tool_calls finish without any tool calls");
            let _ = events.send(AgentEvent::error(
                "Model requested tool_calls but none were provided.",
            ));
            return Ok(());
        }

        let tool_calls: Vec<ToolCall> = tool_calls.into_iter().map(normalize_tool_call).collect();
        messages.push(ChatMessage::assistant_tool_calls(tool_calls.clone()));

        for call in &tool_calls {
            if cancel.is_cancelled() {
                return Err(AgentError::Canceled);
            }
            let name = call.name();
            let _ = events.send(AgentEvent::tool_status(ToolStatus::Running, name));
            debug!(round, tool = name, tool_call_id = %call.id, "dispatching tool");

            let result = inner
                .dispatcher
                .dispatch(name, &call.function.arguments, caller)
                .await?;

            let _ = events.send(AgentEvent::tool_status(ToolStatus::Done, name));
            messages.push(ChatMessage::tool_result(
                call.id.clone(),
                serde_json::to_string(&result)?,
            ));
        }
    }

    warn!(rounds = MAX_TOOL_ROUNDS, "round limit reached with tool calls pending");
    let _ = events.send(AgentEvent::error(format!(
        "Stopped after {MAX_TOOL_ROUNDS} tool rounds without a final answer."
    )));
    Ok(())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
