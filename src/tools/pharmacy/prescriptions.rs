use async_trait::async_trait;
use serde_json::{json, Value};

use super::PharmacyTool;
use crate::error::Result;
use crate::store::{NewTicket, TicketKind};
use crate::tools::{Tool, ToolArguments, ToolContext, ToolParameters};

pub struct CreatePrescriptionRequest {
    parameters: ToolParameters,
}

impl CreatePrescriptionRequest {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object()
                .string("user_id", "", true)
                .string("medication_id", "", true)
                .string("pickup_store", "", false)
                .build(),
        }
    }
}

impl Default for CreatePrescriptionRequest {
    fn default() -> Self {
        Self::new()
    }
}

fn failed(error: &str) -> Value {
    json!({"request_id": null, "status": "error", "error": error})
}

#[async_trait]
impl Tool for CreatePrescriptionRequest {
    fn name(&self) -> &str {
        PharmacyTool::CreatePrescriptionRequest.as_str()
    }

    fn description(&self) -> &str {
        "Create a prescription fulfillment/request ticket for a user and medication (no medical advice)."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<Value> {
        let user_id = args.trimmed("user_id");
        let medication_id = args.trimmed("medication_id");
        let pickup_store = Some(args.trimmed("pickup_store")).filter(|s| !s.is_empty());

        if user_id.is_empty() || medication_id.is_empty() {
            return Ok(failed("missing_required_fields"));
        }
        if ctx.store.user(&user_id).await?.is_none() {
            return Ok(failed("unknown_user"));
        }
        if ctx.store.medication(&medication_id).await?.is_none() {
            return Ok(failed("unknown_medication"));
        }

        let ticket = ctx
            .store
            .create_ticket(NewTicket {
                kind: TicketKind::PrescriptionRequest,
                user_id: Some(user_id),
                medication_id: Some(medication_id),
                store_name: pickup_store.clone(),
                payload: json!({ "pickup_store": pickup_store }),
            })
            .await?;
        Ok(json!({"request_id": ticket.id, "status": "created"}))
    }
}
