//! TourCatalog management: the administrative side of the tour list and the
//! fan-facing availability reads.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::Tour;
use crate::store::StoreCounts;

use super::error::{FlowError, FlowResult, ValidationErrors};
use super::Journey;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTour {
    pub title: String,
    pub date: DateTime<Utc>,
    pub city: String,
    pub venue: String,
    pub artists: String,
    pub ticket_limit: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update; absent fields are left untouched. The claim counter is
/// not settable here, only ticket issuance moves it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TourUpdate {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub city: Option<String>,
    pub venue: Option<String>,
    pub artists: Option<String>,
    pub ticket_limit: Option<i32>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl Journey {
    pub async fn create_tour(&self, new_tour: NewTour) -> FlowResult<Tour> {
        let mut errors = ValidationErrors::new();
        if new_tour.title.trim().is_empty() {
            errors.add("title", "title is required");
        }
        if new_tour.city.trim().is_empty() {
            errors.add("city", "city is required");
        }
        if new_tour.venue.trim().is_empty() {
            errors.add("venue", "venue is required");
        }
        if new_tour.ticket_limit <= 0 {
            errors.add("ticket_limit", "ticket limit must be positive");
        }
        if !errors.is_empty() {
            return Err(FlowError::ValidationFailed(errors));
        }

        let now = Utc::now();
        let tour = Tour {
            id: Uuid::new_v4(),
            title: new_tour.title.trim().to_string(),
            date: new_tour.date,
            city: new_tour.city.trim().to_string(),
            venue: new_tour.venue.trim().to_string(),
            artists: new_tour.artists.trim().to_string(),
            ticket_limit: new_tour.ticket_limit,
            tickets_claimed: 0,
            is_active: true,
            description: new_tour.description,
            image_url: new_tour.image_url,
            created_at: now,
            updated_at: now,
        };
        self.store().insert_tour(&tour).await?;
        tracing::info!(tour_id = %tour.id, title = %tour.title, "tour created");
        Ok(tour)
    }

    pub async fn update_tour(&self, tour_id: Uuid, update: TourUpdate) -> FlowResult<Tour> {
        let mut tour = self
            .store()
            .tour_by_id(tour_id)
            .await?
            .ok_or(FlowError::NotFound("tour"))?;

        if let Some(title) = update.title {
            tour.title = title;
        }
        if let Some(date) = update.date {
            tour.date = date;
        }
        if let Some(city) = update.city {
            tour.city = city;
        }
        if let Some(venue) = update.venue {
            tour.venue = venue;
        }
        if let Some(artists) = update.artists {
            tour.artists = artists;
        }
        if let Some(limit) = update.ticket_limit {
            // Lowering the limit below what is already claimed would make
            // existing tickets unaccounted for.
            if limit < tour.tickets_claimed {
                return Err(FlowError::ValidationFailed(ValidationErrors::single(
                    "ticket_limit",
                    "ticket limit cannot be below tickets already claimed",
                )));
            }
            tour.ticket_limit = limit;
        }
        if let Some(active) = update.is_active {
            tour.is_active = active;
        }
        if update.description.is_some() {
            tour.description = update.description;
        }
        if update.image_url.is_some() {
            tour.image_url = update.image_url;
        }
        tour.updated_at = Utc::now();
        self.store().update_tour(&tour).await?;
        Ok(tour)
    }

    /// Flip a tour's active flag. Deactivation blocks new selections but
    /// leaves existing ones, and their tickets, untouched.
    pub async fn toggle_tour_active(&self, tour_id: Uuid) -> FlowResult<Tour> {
        let mut tour = self
            .store()
            .tour_by_id(tour_id)
            .await?
            .ok_or(FlowError::NotFound("tour"))?;
        tour.is_active = !tour.is_active;
        tour.updated_at = Utc::now();
        self.store().update_tour(&tour).await?;
        tracing::info!(tour_id = %tour.id, is_active = tour.is_active, "tour toggled");
        Ok(tour)
    }

    pub async fn list_tours(&self) -> FlowResult<Vec<Tour>> {
        Ok(self.store().list_tours(false).await?)
    }

    /// Active tours with capacity left, the list fans pick from.
    pub async fn available_tours(&self) -> FlowResult<Vec<Tour>> {
        let tours = self.store().list_tours(true).await?;
        Ok(tours.into_iter().filter(Tour::is_available).collect())
    }

    pub async fn tour(&self, tour_id: Uuid) -> FlowResult<Tour> {
        self.store()
            .tour_by_id(tour_id)
            .await?
            .ok_or(FlowError::NotFound("tour"))
    }

    pub async fn stats(&self) -> FlowResult<StoreCounts> {
        Ok(self.store().counts().await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::store::FanStore;

    use super::super::support;
    use super::*;

    fn new_tour(limit: i32) -> NewTour {
        NewTour {
            title: "Echo World Tour".to_string(),
            date: Utc::now(),
            city: "Lagos".to_string(),
            venue: "Eko Arena".to_string(),
            artists: "Echo".to_string(),
            ticket_limit: limit,
            description: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn create_validates_and_starts_active() {
        let (journey, _store) = support::journey();

        let err = journey.create_tour(new_tour(0)).await.unwrap_err();
        assert!(matches!(err, FlowError::ValidationFailed(_)));

        let tour = journey.create_tour(new_tour(50)).await.unwrap();
        assert!(tour.is_active);
        assert_eq!(tour.tickets_claimed, 0);
        assert_eq!(journey.tour(tour.id).await.unwrap().id, tour.id);
    }

    #[tokio::test]
    async fn update_cannot_strand_claimed_tickets() {
        let (journey, store) = support::journey();
        let mut tour = support::seed_tour(&store, 10, true).await;
        tour.tickets_claimed = 4;
        store.update_tour(&tour).await.unwrap();

        let err = journey
            .update_tour(
                tour.id,
                TourUpdate {
                    ticket_limit: Some(3),
                    ..TourUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::ValidationFailed(_)));

        let updated = journey
            .update_tour(
                tour.id,
                TourUpdate {
                    ticket_limit: Some(4),
                    city: Some("Abuja".to_string()),
                    ..TourUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.ticket_limit, 4);
        assert_eq!(updated.city, "Abuja");
        assert_eq!(updated.venue, tour.venue, "untouched fields survive");
    }

    #[tokio::test]
    async fn toggling_hides_a_tour_from_the_available_list() {
        let (journey, store) = support::journey();
        let open = support::seed_tour(&store, 10, true).await;
        let full = support::seed_tour(&store, 0, true).await;
        support::seed_tour(&store, 10, false).await;

        let available = journey.available_tours().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, open.id);
        assert_eq!(journey.list_tours().await.unwrap().len(), 3);

        let toggled = journey.toggle_tour_active(open.id).await.unwrap();
        assert!(!toggled.is_active);
        assert!(journey.available_tours().await.unwrap().is_empty());

        // Sold-out tours stay listed as active but never as available.
        assert!(journey.tour(full.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn deactivation_leaves_existing_selections_alone() {
        let (journey, store) = support::journey();
        let fan = support::register(&journey).await;
        let tour = support::seed_tour(&store, 10, true).await;
        journey.select_tour(fan.id, tour.id).await.unwrap();

        journey.toggle_tour_active(tour.id).await.unwrap();
        assert_eq!(journey.selections(fan.id).await.unwrap().len(), 1);

        // But new selections of it are rejected.
        let other = support::register(&journey).await;
        let err = journey.select_tour(other.id, tour.id).await.unwrap_err();
        assert!(matches!(err, FlowError::TourUnavailable { .. }));
    }

    #[tokio::test]
    async fn stats_reflect_the_store() {
        let (journey, store) = support::journey();
        support::register(&journey).await;
        let tour = support::seed_tour(&store, 10, true).await;
        support::seed_tour(&store, 10, false).await;
        let fan = support::register(&journey).await;
        journey.select_tour(fan.id, tour.id).await.unwrap();

        let counts = journey.stats().await.unwrap();
        assert_eq!(counts.total_fans, 2);
        assert_eq!(counts.total_tours, 2);
        assert_eq!(counts.active_tours, 1);
        assert_eq!(counts.total_selections, 1);
    }
}
