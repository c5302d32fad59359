//! Persistence port for the fan journey.
//!
//! The domain assumes read-your-writes consistency within one fan's
//! operations. Multi-row writes that must land together (a fan row plus its
//! selection set, a ticket plus its selection flip) are single trait
//! methods so each backend can make them atomic.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ConsentRecord, Fan, Ticket, Tour, TourSelection};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("conflicting write: {0}")]
    Conflict(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreCounts {
    pub total_fans: i64,
    pub total_tours: i64,
    pub active_tours: i64,
    pub total_selections: i64,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait FanStore: Send + Sync {
    // Fans
    async fn insert_fan(&self, fan: &Fan) -> StoreResult<()>;
    async fn update_fan(&self, fan: &Fan) -> StoreResult<()>;
    async fn fan_by_id(&self, id: Uuid) -> StoreResult<Option<Fan>>;
    async fn fan_by_email(&self, email: &str) -> StoreResult<Option<Fan>>;
    async fn fan_by_code(&self, code: &str) -> StoreResult<Option<Fan>>;

    // Selections. `write_selection_state` persists the fan row (carrying the
    // refreshed counters) and the complete selection set in one transaction;
    // it is the only selection write path, which makes bulk replacement
    // all-or-nothing for free.
    async fn write_selection_state(
        &self,
        fan: &Fan,
        selections: &[TourSelection],
    ) -> StoreResult<()>;
    async fn selections_for_fan(&self, fan_id: Uuid) -> StoreResult<Vec<TourSelection>>;
    async fn selection_by_id(&self, id: Uuid) -> StoreResult<Option<TourSelection>>;

    // Consent. Written together with the fan's `has_completed_consent` flag.
    async fn write_consent(&self, fan: &Fan, consent: &ConsentRecord) -> StoreResult<()>;
    async fn update_consent(&self, consent: &ConsentRecord) -> StoreResult<()>;
    async fn consent_for_fan(&self, fan_id: Uuid) -> StoreResult<Option<ConsentRecord>>;

    // Tickets. `write_issuance` replaces any previous ticket for the
    // selection (invalidating its download reference), updates the
    // selection's ticket fields, and, when `tour` is given, persists the
    // bumped claim counter - atomically.
    async fn write_issuance(
        &self,
        selection: &TourSelection,
        ticket: &Ticket,
        tour: Option<&Tour>,
    ) -> StoreResult<()>;
    async fn tickets_for_selections(&self, selection_ids: &[Uuid]) -> StoreResult<Vec<Ticket>>;
    async fn ticket_by_id(&self, ticket_id: &str) -> StoreResult<Option<Ticket>>;

    // Tours
    async fn insert_tour(&self, tour: &Tour) -> StoreResult<()>;
    async fn update_tour(&self, tour: &Tour) -> StoreResult<()>;
    async fn tour_by_id(&self, id: Uuid) -> StoreResult<Option<Tour>>;
    async fn list_tours(&self, active_only: bool) -> StoreResult<Vec<Tour>>;

    // Admin
    async fn counts(&self) -> StoreResult<StoreCounts>;
}
