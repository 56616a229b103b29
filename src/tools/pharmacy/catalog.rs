use async_trait::async_trait;
use serde_json::{json, Value};

use super::{normalize, PharmacyTool};
use crate::error::Result;
use crate::tools::{Tool, ToolArguments, ToolContext, ToolParameters};

const SEARCH_LIMIT: usize = 10;

/// Local brand names mapped to the catalog's generic names.
const BRAND_ALIASES: &[(&str, &str)] = &[("dexamol", "paracetamol"), ("דקסמול", "פרצטמול")];

pub struct GetMedicationByName {
    parameters: ToolParameters,
}

impl GetMedicationByName {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object()
                .string("query", "Medication name query (EN/HE).", true)
                .build(),
        }
    }
}

impl Default for GetMedicationByName {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(error: &str, alternatives: Vec<String>) -> Value {
    json!({"found": false, "medication": null, "alternatives": alternatives, "error": error})
}

#[async_trait]
impl Tool for GetMedicationByName {
    fn name(&self) -> &str {
        PharmacyTool::GetMedicationByName.as_str()
    }

    fn description(&self) -> &str {
        "Resolve a user-provided medication name (English/Hebrew) to a medication record in the catalog."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<Value> {
        let query = args.trimmed("query");
        if query.is_empty() {
            return Ok(not_found("empty_query", Vec::new()));
        }

        let mut needle = normalize(&query);
        if let Some((_, generic)) = BRAND_ALIASES.iter().find(|(brand, _)| *brand == needle) {
            needle = generic.to_string();
        }

        let exact = ctx.store.medications_named(&needle).await?;
        if let [only] = exact.as_slice() {
            return Ok(json!({"found": true, "medication": only, "alternatives": []}));
        }

        let mut matches = ctx.store.search_medications(&needle, SEARCH_LIMIT).await?;
        match matches.len() {
            0 => Ok(not_found("not_found", Vec::new())),
            1 => {
                let med = matches.remove(0);
                Ok(json!({"found": true, "medication": med, "alternatives": []}))
            }
            _ => Ok(not_found(
                "ambiguous",
                matches.into_iter().map(|m| m.name).collect(),
            )),
        }
    }
}

pub struct CheckPrescriptionRequirement {
    parameters: ToolParameters,
}

impl CheckPrescriptionRequirement {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object()
                .string("medication_id", "", true)
                .build(),
        }
    }
}

impl Default for CheckPrescriptionRequirement {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CheckPrescriptionRequirement {
    fn name(&self) -> &str {
        PharmacyTool::CheckPrescriptionRequirement.as_str()
    }

    fn description(&self) -> &str {
        "Return whether a medication requires a prescription (Rx) or is OTC."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<Value> {
        let medication_id = args.trimmed("medication_id");
        if medication_id.is_empty() {
            return Ok(json!({"requires_prescription": null, "notes": "", "error": "missing_medication_id"}));
        }
        let Some(med) = ctx.store.medication(&medication_id).await? else {
            return Ok(json!({"requires_prescription": null, "notes": "", "error": "not_found"}));
        };
        let requires = med.requires_prescription();
        let notes = if requires {
            "Prescription required (Rx)."
        } else {
            "Over-the-counter (OTC)."
        };
        Ok(json!({"requires_prescription": requires, "notes": notes}))
    }
}
