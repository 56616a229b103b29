//! Apothecary: a streaming pharmacist-assistant agent.
//!
//! A client conversation is sent to an OpenAI-style chat-completions model
//! with a fixed set of pharmacy tools. Model text streams back as it is
//! generated; tool calls requested mid-stream are rebuilt from fragments,
//! run against the store, and fed back until the model answers or the round
//! limit is reached. Every run ends with exactly one `done` event.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use apothecary::agent_loop::{LoopRunner, RunRequest};
//! use apothecary::config::AgentConfig;
//! use apothecary::store::{MemoryStore, PharmacyStore};
//! use apothecary::tools::{ToolDispatcher, ToolRegistry};
//! use apothecary::types::ChatMessage;
//!
//! # async fn example() -> apothecary::error::Result<()> {
//! let config = AgentConfig::load()?;
//! let store: Arc<dyn PharmacyStore> = Arc::new(MemoryStore::seeded());
//! let dispatcher = ToolDispatcher::new(Arc::new(ToolRegistry::pharmacy()), Some(store));
//! let runner = LoopRunner::new(&config, dispatcher);
//!
//! let request = RunRequest::new(vec![ChatMessage::user("Do you have Paracetamol in stock?")]);
//! for event in runner.start(request).collect().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent_loop;
pub mod config;
pub mod error;
pub mod policy;
pub mod provider;
pub mod store;
pub mod tools;
pub mod types;
pub mod wire;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;
