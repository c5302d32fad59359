//! In-memory store. Used by the test suite and as the dev fallback when no
//! `DATABASE_URL` is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ConsentRecord, Fan, Ticket, Tour, TourSelection};

use super::{FanStore, StoreCounts, StoreResult};

#[derive(Default)]
struct Inner {
    fans: HashMap<Uuid, Fan>,
    selections: HashMap<Uuid, TourSelection>,
    consents: HashMap<Uuid, ConsentRecord>,
    // keyed by selection id: at most one live ticket per selection
    tickets: HashMap<Uuid, Ticket>,
    tours: HashMap<Uuid, Tour>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FanStore for MemoryStore {
    async fn insert_fan(&self, fan: &Fan) -> StoreResult<()> {
        self.inner.write().await.fans.insert(fan.id, fan.clone());
        Ok(())
    }

    async fn update_fan(&self, fan: &Fan) -> StoreResult<()> {
        self.inner.write().await.fans.insert(fan.id, fan.clone());
        Ok(())
    }

    async fn fan_by_id(&self, id: Uuid) -> StoreResult<Option<Fan>> {
        Ok(self.inner.read().await.fans.get(&id).cloned())
    }

    async fn fan_by_email(&self, email: &str) -> StoreResult<Option<Fan>> {
        let inner = self.inner.read().await;
        Ok(inner.fans.values().find(|f| f.email == email).cloned())
    }

    async fn fan_by_code(&self, code: &str) -> StoreResult<Option<Fan>> {
        let inner = self.inner.read().await;
        Ok(inner
            .fans
            .values()
            .find(|f| f.registration_code == code)
            .cloned())
    }

    async fn write_selection_state(
        &self,
        fan: &Fan,
        selections: &[TourSelection],
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.fans.insert(fan.id, fan.clone());
        inner.selections.retain(|_, s| s.fan_id != fan.id);
        for selection in selections {
            inner.selections.insert(selection.id, selection.clone());
        }
        Ok(())
    }

    async fn selections_for_fan(&self, fan_id: Uuid) -> StoreResult<Vec<TourSelection>> {
        let inner = self.inner.read().await;
        let mut selections: Vec<TourSelection> = inner
            .selections
            .values()
            .filter(|s| s.fan_id == fan_id)
            .cloned()
            .collect();
        selections.sort_by_key(|s| s.selected_at);
        Ok(selections)
    }

    async fn selection_by_id(&self, id: Uuid) -> StoreResult<Option<TourSelection>> {
        Ok(self.inner.read().await.selections.get(&id).cloned())
    }

    async fn write_consent(&self, fan: &Fan, consent: &ConsentRecord) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.fans.insert(fan.id, fan.clone());
        inner.consents.insert(consent.fan_id, consent.clone());
        Ok(())
    }

    async fn update_consent(&self, consent: &ConsentRecord) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .consents
            .insert(consent.fan_id, consent.clone());
        Ok(())
    }

    async fn consent_for_fan(&self, fan_id: Uuid) -> StoreResult<Option<ConsentRecord>> {
        Ok(self.inner.read().await.consents.get(&fan_id).cloned())
    }

    async fn write_issuance(
        &self,
        selection: &TourSelection,
        ticket: &Ticket,
        tour: Option<&Tour>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.selections.insert(selection.id, selection.clone());
        inner.tickets.insert(selection.id, ticket.clone());
        if let Some(tour) = tour {
            inner.tours.insert(tour.id, tour.clone());
        }
        Ok(())
    }

    async fn tickets_for_selections(&self, selection_ids: &[Uuid]) -> StoreResult<Vec<Ticket>> {
        let inner = self.inner.read().await;
        let mut tickets: Vec<Ticket> = selection_ids
            .iter()
            .filter_map(|id| inner.tickets.get(id).cloned())
            .collect();
        tickets.sort_by_key(|t| t.generated_at);
        Ok(tickets)
    }

    async fn ticket_by_id(&self, ticket_id: &str) -> StoreResult<Option<Ticket>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tickets
            .values()
            .find(|t| t.ticket_id == ticket_id)
            .cloned())
    }

    async fn insert_tour(&self, tour: &Tour) -> StoreResult<()> {
        self.inner.write().await.tours.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn update_tour(&self, tour: &Tour) -> StoreResult<()> {
        self.inner.write().await.tours.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn tour_by_id(&self, id: Uuid) -> StoreResult<Option<Tour>> {
        Ok(self.inner.read().await.tours.get(&id).cloned())
    }

    async fn list_tours(&self, active_only: bool) -> StoreResult<Vec<Tour>> {
        let inner = self.inner.read().await;
        let mut tours: Vec<Tour> = inner
            .tours
            .values()
            .filter(|t| !active_only || t.is_active)
            .cloned()
            .collect();
        tours.sort_by_key(|t| t.date);
        Ok(tours)
    }

    async fn counts(&self) -> StoreResult<StoreCounts> {
        let inner = self.inner.read().await;
        Ok(StoreCounts {
            total_fans: inner.fans.len() as i64,
            total_tours: inner.tours.len() as i64,
            active_tours: inner.tours.values().filter(|t| t.is_active).count() as i64,
            total_selections: inner.selections.len() as i64,
        })
    }
}
