//! Tour catalog lookups used by the selection manager to validate
//! availability before a tour can be claimed.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::store::{FanStore, StoreResult};

#[derive(Debug, Clone)]
pub struct TourAvailability {
    pub is_active: bool,
    pub tickets_remaining: i32,
}

impl TourAvailability {
    pub fn is_available(&self) -> bool {
        self.is_active && self.tickets_remaining > 0
    }
}

#[async_trait]
pub trait TourCatalog: Send + Sync {
    /// `None` means the tour is unknown to the catalog.
    async fn availability(&self, tour_id: Uuid) -> StoreResult<Option<TourAvailability>>;
}

/// Catalog backed by the tours table of the primary store.
pub struct StoreCatalog {
    store: Arc<dyn FanStore>,
}

impl StoreCatalog {
    pub fn new(store: Arc<dyn FanStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TourCatalog for StoreCatalog {
    async fn availability(&self, tour_id: Uuid) -> StoreResult<Option<TourAvailability>> {
        let tour = self.store.tour_by_id(tour_id).await?;
        Ok(tour.map(|t| TourAvailability {
            is_active: t.is_active,
            tickets_remaining: t.tickets_remaining(),
        }))
    }
}
