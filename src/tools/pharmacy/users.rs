use async_trait::async_trait;
use serde_json::{json, Value};

use super::PharmacyTool;
use crate::error::Result;
use crate::store::User;
use crate::tools::{Tool, ToolArguments, ToolContext, ToolParameters};

const MIN_PHONE_LEN: usize = 7;

/// Keep only `+` and ASCII digits.
pub(crate) fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn user_summary(user: &User) -> Value {
    json!({
        "id": user.id,
        "full_name": user.full_name,
        "preferred_language": user.preferred_language,
    })
}

pub struct GetUserByPhone {
    parameters: ToolParameters,
}

impl GetUserByPhone {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object().string("phone", "", true).build(),
        }
    }
}

impl Default for GetUserByPhone {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetUserByPhone {
    fn name(&self) -> &str {
        PharmacyTool::GetUserByPhone.as_str()
    }

    fn description(&self) -> &str {
        "Look up a user by phone number to continue prescription workflows."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<Value> {
        let phone = args.trimmed("phone");
        if phone.chars().count() < MIN_PHONE_LEN {
            return Ok(json!({"found": false, "user": null, "error": "invalid_phone"}));
        }
        match ctx.store.user_by_phone(&normalize_phone(&phone)).await? {
            Some(user) => Ok(json!({"found": true, "user": user_summary(&user)})),
            None => Ok(json!({"found": false, "user": null})),
        }
    }
}

pub struct GetCurrentUser {
    parameters: ToolParameters,
}

impl GetCurrentUser {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::empty(),
        }
    }
}

impl Default for GetCurrentUser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetCurrentUser {
    fn name(&self) -> &str {
        PharmacyTool::GetCurrentUser.as_str()
    }

    fn description(&self) -> &str {
        "Get information about the currently authenticated user. Use this for prescription requests instead of asking for phone number."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    fn identity_aware(&self) -> bool {
        true
    }

    async fn execute(&self, _args: &ToolArguments, ctx: &ToolContext) -> Result<Value> {
        let Some(user_id) = ctx.caller.as_deref().filter(|id| !id.is_empty()) else {
            return Ok(json!({"found": false, "user": null, "error": "authentication_required"}));
        };
        match ctx.store.user(user_id).await? {
            Some(user) => Ok(json!({
                "found": true,
                "user": {
                    "id": user.id,
                    "full_name": user.full_name,
                    "phone": user.phone,
                    "preferred_language": user.preferred_language,
                },
            })),
            None => Ok(json!({"found": false, "user": null})),
        }
    }
}
