//! Resolves a model tool call to a tool and runs it.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::arguments::ToolArguments;
use super::registry::ToolRegistry;
use super::tool::ToolContext;
use crate::error::Result;
use crate::store::PharmacyStore;

/// Bridge between the agent loop and the tool registry.
///
/// Recoverable failures come back as JSON objects with an `error` field, so the
/// model sees them as ordinary tool output. Only tool handler errors propagate.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    store: Option<Arc<dyn PharmacyStore>>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, store: Option<Arc<dyn PharmacyStore>>) -> Self {
        Self { registry, store }
    }

    /// Tool definitions to advertise to the model.
    pub fn definitions(&self) -> Vec<Value> {
        self.registry.definitions()
    }

    /// Run one tool call.
    ///
    /// Checks happen in a fixed order: unknown name, malformed arguments,
    /// missing store, then execution. The caller's identity only reaches
    /// identity-aware tools.
    pub async fn dispatch(&self, name: &str, raw_arguments: &str, caller: Option<&str>) -> Result<Value> {
        let Some(tool) = self.registry.resolve(name) else {
            debug!(tool = name, "unknown tool requested");
            return Ok(json!({"error": "unknown_tool", "tool": name}));
        };

        let args = match ToolArguments::parse(raw_arguments) {
            Ok(args) => args,
            Err(err) => {
                debug!(tool = name, error = %err, "tool arguments rejected");
                return Ok(json!({"error": "invalid_tool_arguments_json"}));
            }
        };

        let Some(store) = self.store.clone() else {
            return Ok(json!({"error": "db_unavailable"}));
        };

        let ctx = ToolContext {
            store,
            caller: tool
                .identity_aware()
                .then(|| caller.map(str::to_string))
                .flatten(),
        };
        tool.execute(&args, &ctx).await
    }
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("registry", &self.registry)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
