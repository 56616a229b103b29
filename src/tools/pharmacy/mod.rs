//! The pharmacy tool set exposed to the model.

mod catalog;
mod inventory;
mod prescriptions;
mod users;

use std::sync::Arc;

use strum::{EnumIter, EnumString, IntoStaticStr};

pub use catalog::{CheckPrescriptionRequirement, GetMedicationByName};
pub use inventory::{CheckInventory, ReserveInventory};
pub use prescriptions::CreatePrescriptionRequest;
pub use users::{GetCurrentUser, GetUserByPhone};

use super::tool::Tool;

/// Closed set of built-in tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum PharmacyTool {
    GetMedicationByName,
    CheckInventory,
    CheckPrescriptionRequirement,
    GetUserByPhone,
    GetCurrentUser,
    CreatePrescriptionRequest,
    ReserveInventory,
}

impl PharmacyTool {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Instantiate the tool implementation for this name.
    pub fn build(self) -> Arc<dyn Tool> {
        match self {
            Self::GetMedicationByName => Arc::new(GetMedicationByName::new()),
            Self::CheckInventory => Arc::new(CheckInventory::new()),
            Self::CheckPrescriptionRequirement => Arc::new(CheckPrescriptionRequirement::new()),
            Self::GetUserByPhone => Arc::new(GetUserByPhone::new()),
            Self::GetCurrentUser => Arc::new(GetCurrentUser::new()),
            Self::CreatePrescriptionRequest => Arc::new(CreatePrescriptionRequest::new()),
            Self::ReserveInventory => Arc::new(ReserveInventory::new()),
        }
    }
}

/// Trim, collapse inner whitespace, lowercase.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
