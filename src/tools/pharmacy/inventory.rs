use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::{normalize, PharmacyTool};
use crate::error::Result;
use crate::store::{Reservation, ReserveOutcome};
use crate::tools::{Tool, ToolArguments, ToolContext, ToolParameters};

const LOW_STOCK_BELOW: i64 = 5;

/// Stock level bucket reported to the model.
pub(crate) fn inventory_status(quantity: i64) -> &'static str {
    if quantity <= 0 {
        "out"
    } else if quantity < LOW_STOCK_BELOW {
        "low"
    } else {
        "in_stock"
    }
}

pub struct CheckInventory {
    parameters: ToolParameters,
}

impl CheckInventory {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object()
                .string("medication_id", "", true)
                .string("store_name", "Optional store name.", false)
                .build(),
        }
    }
}

impl Default for CheckInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CheckInventory {
    fn name(&self) -> &str {
        PharmacyTool::CheckInventory.as_str()
    }

    fn description(&self) -> &str {
        "Check stock availability for a medication, optionally for a specific store."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<Value> {
        let medication_id = args.trimmed("medication_id");
        if medication_id.is_empty() {
            return Ok(json!({"results": [], "error": "missing_medication_id"}));
        }

        let store_name = normalize(&args.trimmed("store_name"));
        let filter = (!store_name.is_empty()).then_some(store_name.as_str());
        let items = ctx.store.inventory(&medication_id, filter).await?;
        if items.is_empty() && filter.is_some() {
            return Ok(json!({"results": [], "error": "unknown_store_or_no_record"}));
        }

        let results: Vec<Value> = items
            .iter()
            .map(|item| {
                json!({
                    "store_name": item.store_name,
                    "quantity": item.quantity,
                    "status": inventory_status(item.quantity),
                })
            })
            .collect();
        Ok(json!({ "results": results }))
    }
}

pub struct ReserveInventory {
    parameters: ToolParameters,
}

impl ReserveInventory {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object()
                .string("medication_id", "", true)
                .string("store_name", "", true)
                .integer("quantity", Some(1), true)
                .build(),
        }
    }
}

impl Default for ReserveInventory {
    fn default() -> Self {
        Self::new()
    }
}

fn refused(reason: &str) -> Value {
    json!({"reserved": false, "reason": reason})
}

#[async_trait]
impl Tool for ReserveInventory {
    fn name(&self) -> &str {
        PharmacyTool::ReserveInventory.as_str()
    }

    fn description(&self) -> &str {
        "Reserve inventory for pickup at a specific store. Decrements stock if successful."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    fn identity_aware(&self) -> bool {
        true
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<Value> {
        let medication_id = args.trimmed("medication_id");
        let store_name = args.trimmed("store_name");
        let quantity = args.get_i64_opt("quantity").unwrap_or(0);

        if medication_id.is_empty() || store_name.is_empty() || quantity <= 0 {
            return Ok(refused("missing_required_fields"));
        }
        let Some(user_id) = ctx.caller.clone().filter(|id| !id.is_empty()) else {
            return Ok(refused("authentication_required"));
        };

        let outcome = ctx
            .store
            .reserve(Reservation {
                medication_id,
                store_name: normalize(&store_name),
                quantity,
                user_id,
            })
            .await?;

        Ok(match outcome {
            ReserveOutcome::Reserved {
                reservation_id,
                remaining,
            } => {
                info!(%reservation_id, quantity, remaining, "inventory reserved");
                json!({"reserved": true, "reservation_id": reservation_id})
            }
            ReserveOutcome::NotFound => refused("store_or_item_not_found"),
            ReserveOutcome::InsufficientStock { .. } => refused("insufficient_stock"),
        })
    }
}
