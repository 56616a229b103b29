//! Shared test helpers: a scripted chat model and a small pharmacy fixture.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use apothecary::agent_loop::LoopRunner;
use apothecary::error::AgentError;
use apothecary::provider::{ChatChunk, ChatModel, ChatRequest, ChatStream, ToolCallDelta};
use apothecary::store::{InventoryItem, Medication, MemoryStore, OtcOrRx, PharmacyStore, User};
use apothecary::tools::{ToolDispatcher, ToolRegistry};
use apothecary::types::{AgentEvent, FinishReason};

pub const PARACETAMOL_ID: &str = "med-paracetamol";
pub const AMOXICILLIN_ID: &str = "med-amoxicillin";
pub const USER_ID: &str = "user-1";
pub const DIZENGOFF: &str = "Tel Aviv - Dizengoff";

enum Round {
    Chunks(Vec<Result<ChatChunk, AgentError>>),
    /// A stream that never yields.
    Stall,
}

/// A chat model that replays queued rounds and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    rounds: Mutex<VecDeque<Round>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue one round of chunks.
    pub fn queue_chunks(&self, chunks: Vec<ChatChunk>) {
        self.rounds
            .lock()
            .unwrap()
            .push_back(Round::Chunks(chunks.into_iter().map(Ok).collect()));
    }

    /// Queue a final answer streamed as the given pieces.
    pub fn queue_text(&self, pieces: &[&str]) {
        let mut chunks: Vec<ChatChunk> = pieces.iter().map(|p| ChatChunk::text(*p)).collect();
        chunks.push(ChatChunk::finish(FinishReason::Stop));
        self.queue_chunks(chunks);
    }

    /// Queue a tool-calls round, one complete call per `(id, name, arguments)`.
    pub fn queue_tool_calls(&self, calls: &[(&str, &str, &str)]) {
        let mut chunks: Vec<ChatChunk> = calls
            .iter()
            .enumerate()
            .map(|(index, (id, name, arguments))| {
                ChatChunk::tool_call(ToolCallDelta {
                    index,
                    id: Some(id.to_string()),
                    name: Some(name.to_string()),
                    arguments: Some(arguments.to_string()),
                })
            })
            .collect();
        chunks.push(ChatChunk::finish(FinishReason::ToolCalls));
        self.queue_chunks(chunks);
    }

    /// Queue a round that yields `chunks` and then fails.
    pub fn queue_failure(&self, chunks: Vec<ChatChunk>, error: AgentError) {
        let mut items: Vec<Result<ChatChunk, AgentError>> = chunks.into_iter().map(Ok).collect();
        items.push(Err(error));
        self.rounds.lock().unwrap().push_back(Round::Chunks(items));
    }

    pub fn queue_stall(&self) {
        self.rounds.lock().unwrap().push_back(Round::Stall);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatStream, AgentError> {
        self.requests.lock().unwrap().push(request.clone());
        let round = self.rounds.lock().unwrap().pop_front();
        match round {
            Some(Round::Chunks(items)) => Ok(futures::stream::iter(items).boxed()),
            Some(Round::Stall) => Ok(futures::stream::pending().boxed()),
            None => Err(AgentError::Stream("script exhausted".into())),
        }
    }
}

pub fn medication(id: &str, name: &str, name_he: &str, otc_or_rx: OtcOrRx) -> Medication {
    Medication {
        id: id.to_string(),
        name: name.to_string(),
        name_he: name_he.to_string(),
        active_ingredients: vec![],
        form: "tablet".to_string(),
        strength: "500 mg".to_string(),
        manufacturer: "Synthetic".to_string(),
        otc_or_rx,
        label_instructions: "Label instructions: test".to_string(),
        warnings: "Warnings: test".to_string(),
    }
}

pub fn user(id: &str, phone: &str) -> User {
    User {
        id: id.to_string(),
        full_name: "Test User".to_string(),
        phone: phone.to_string(),
        preferred_language: "en".to_string(),
        loyalty_id: None,
    }
}

/// Store with paracetamol (OTC) and amoxicillin (Rx) stocked in two stores.
pub async fn sample_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_medication(medication(PARACETAMOL_ID, "Paracetamol", "פרצטמול", OtcOrRx::Otc))
        .await;
    store
        .insert_medication(medication(AMOXICILLIN_ID, "Amoxicillin", "אמוקסיצילין", OtcOrRx::Rx))
        .await;
    store.insert_user(user(USER_ID, "+972501234567")).await;
    store
        .insert_inventory(InventoryItem::new(PARACETAMOL_ID, "S1", DIZENGOFF, 12))
        .await;
    store
        .insert_inventory(InventoryItem::new(PARACETAMOL_ID, "S2", "Jerusalem - Jaffa Rd", 3))
        .await;
    store
        .insert_inventory(InventoryItem::new(AMOXICILLIN_ID, "S1", DIZENGOFF, 5))
        .await;
    store
}

pub fn dispatcher(store: Arc<MemoryStore>) -> ToolDispatcher {
    let store: Arc<dyn PharmacyStore> = store;
    ToolDispatcher::new(Arc::new(ToolRegistry::pharmacy()), Some(store))
}

pub fn runner(model: Arc<ScriptedModel>, store: Arc<MemoryStore>) -> LoopRunner {
    LoopRunner::with_model(model, dispatcher(store))
}

/// Event kinds in order, for sequence assertions.
pub fn kinds(events: &[AgentEvent]) -> Vec<&'static str> {
    events.iter().map(AgentEvent::kind).collect()
}

/// Concatenated delta text.
pub fn text_of(events: &[AgentEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::Delta { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
