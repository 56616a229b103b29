//! In-memory [`PharmacyStore`] backend.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::*;
use super::PharmacyStore;
use crate::error::Result;

#[derive(Debug, Default, Clone)]
pub(crate) struct Tables {
    pub users: Vec<User>,
    pub medications: Vec<Medication>,
    pub inventory: Vec<InventoryItem>,
    pub tickets: Vec<Ticket>,
}

/// Store backed by process memory behind one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store populated with the demo catalog, users, and stock.
    pub fn seeded() -> Self {
        Self {
            tables: RwLock::new(super::seed::demo_tables()),
        }
    }

    pub async fn insert_user(&self, user: User) {
        self.tables.write().await.users.push(user);
    }

    pub async fn insert_medication(&self, medication: Medication) {
        self.tables.write().await.medications.push(medication);
    }

    pub async fn insert_inventory(&self, item: InventoryItem) {
        self.tables.write().await.inventory.push(item);
    }

    /// Snapshot of all tickets, oldest first.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tables.read().await.tickets.clone()
    }

    pub async fn inventory_row(&self, id: &str) -> Option<InventoryItem> {
        self.tables
            .read()
            .await
            .inventory
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }
}

fn name_matches(med: &Medication, pred: impl Fn(&str) -> bool) -> bool {
    pred(&med.name.to_lowercase()) || pred(&med.name_he.to_lowercase())
}

#[async_trait]
impl PharmacyStore for MemoryStore {
    async fn medications_named(&self, name: &str) -> Result<Vec<Medication>> {
        let tables = self.tables.read().await;
        Ok(tables
            .medications
            .iter()
            .filter(|m| name_matches(m, |n| n == name))
            .cloned()
            .collect())
    }

    async fn search_medications(&self, needle: &str, limit: usize) -> Result<Vec<Medication>> {
        let tables = self.tables.read().await;
        Ok(tables
            .medications
            .iter()
            .filter(|m| name_matches(m, |n| n.contains(needle)))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn medication(&self, id: &str) -> Result<Option<Medication>> {
        let tables = self.tables.read().await;
        Ok(tables.medications.iter().find(|m| m.id == id).cloned())
    }

    async fn inventory(&self, medication_id: &str, store_name: Option<&str>) -> Result<Vec<InventoryItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .inventory
            .iter()
            .filter(|item| item.medication_id == medication_id)
            .filter(|item| store_name.map_or(true, |s| item.store_name.to_lowercase() == s))
            .cloned()
            .collect())
    }

    async fn user(&self, id: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.phone == phone).cloned())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let ticket = ticket.into_ticket();
        self.tables.write().await.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn reserve(&self, reservation: Reservation) -> Result<ReserveOutcome> {
        // Check and decrement under one write guard.
        let mut tables = self.tables.write().await;
        let Some(item) = tables.inventory.iter_mut().find(|item| {
            item.medication_id == reservation.medication_id
                && item.store_name.to_lowercase() == reservation.store_name
        }) else {
            return Ok(ReserveOutcome::NotFound);
        };
        if item.quantity < reservation.quantity {
            return Ok(ReserveOutcome::InsufficientStock {
                available: item.quantity,
            });
        }
        item.quantity -= reservation.quantity;
        item.last_updated = Utc::now();
        let remaining = item.quantity;
        let store_name = item.store_name.clone();

        let ticket = NewTicket {
            kind: TicketKind::InventoryReservation,
            user_id: Some(reservation.user_id),
            medication_id: Some(reservation.medication_id),
            store_name: Some(store_name),
            payload: serde_json::json!({ "quantity": reservation.quantity }),
        }
        .into_ticket();
        let reservation_id = ticket.id.clone();
        tables.tickets.push(ticket);

        Ok(ReserveOutcome::Reserved {
            reservation_id,
            remaining,
        })
    }
}
