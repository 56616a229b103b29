//! Pharmacy storage: the trait tools run against and an in-memory backend.
//!
//! Store names are matched case-insensitively; callers pass the normalized
//! (trimmed, whitespace-collapsed, lowercased) form.

pub mod memory;
pub mod models;
pub mod seed;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;
pub use models::*;

/// Storage operations the pharmacy tools need.
///
/// Every mutation is atomic per call: [`PharmacyStore::reserve`] checks and
/// decrements stock in one step, so concurrent reservations against the same
/// row cannot both succeed past the available quantity.
#[async_trait]
pub trait PharmacyStore: Send + Sync {
    /// Medications whose English or Hebrew name equals `name` (case-insensitive).
    async fn medications_named(&self, name: &str) -> Result<Vec<Medication>>;

    /// Medications whose English or Hebrew name contains `needle`, at most `limit`.
    async fn search_medications(&self, needle: &str, limit: usize) -> Result<Vec<Medication>>;

    async fn medication(&self, id: &str) -> Result<Option<Medication>>;

    /// Inventory rows for a medication, optionally restricted to one store.
    async fn inventory(&self, medication_id: &str, store_name: Option<&str>) -> Result<Vec<InventoryItem>>;

    async fn user(&self, id: &str) -> Result<Option<User>>;

    async fn user_by_phone(&self, phone: &str) -> Result<Option<User>>;

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket>;

    /// Decrement stock and record an `inventory_reservation` ticket, or report why not.
    async fn reserve(&self, reservation: Reservation) -> Result<ReserveOutcome>;
}
