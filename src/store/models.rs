//! Pharmacy records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub preferred_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty_id: Option<String>,
}

/// Dispensing class of a medication.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OtcOrRx {
    Otc,
    Rx,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub name_he: String,
    pub active_ingredients: Vec<String>,
    pub form: String,
    pub strength: String,
    pub manufacturer: String,
    pub otc_or_rx: OtcOrRx,
    pub label_instructions: String,
    pub warnings: String,
}

impl Medication {
    pub fn requires_prescription(&self) -> bool {
        self.otc_or_rx == OtcOrRx::Rx
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: String,
    pub medication_id: String,
    pub store_id: String,
    pub store_name: String,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        medication_id: impl Into<String>,
        store_id: impl Into<String>,
        store_name: impl Into<String>,
        quantity: i64,
    ) -> Self {
        Self {
            id: new_id(),
            medication_id: medication_id.into(),
            store_id: store_id.into(),
            store_name: store_name.into(),
            quantity,
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketKind {
    PrescriptionRequest,
    InventoryReservation,
    CustomerService,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: String,
    pub kind: TicketKind,
    pub user_id: Option<String>,
    pub medication_id: Option<String>,
    pub store_name: Option<String>,
    pub payload: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a ticket about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub kind: TicketKind,
    pub user_id: Option<String>,
    pub medication_id: Option<String>,
    pub store_name: Option<String>,
    pub payload: serde_json::Value,
}

impl NewTicket {
    pub(crate) fn into_ticket(self) -> Ticket {
        Ticket {
            id: new_id(),
            kind: self.kind,
            user_id: self.user_id,
            medication_id: self.medication_id,
            store_name: self.store_name,
            payload: self.payload,
            status: "created".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A request to hold stock for pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub medication_id: String,
    /// Store name, already normalized (trimmed, lowercased).
    pub store_name: String,
    pub quantity: i64,
    pub user_id: String,
}

/// Outcome of [`super::PharmacyStore::reserve`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReserveOutcome {
    Reserved { reservation_id: String, remaining: i64 },
    NotFound,
    InsufficientStock { available: i64 },
}
