//! TicketOrchestrator: decides, from the selection set and the gates,
//! whether tickets must be (re)generated, and exposes the fan-visible
//! ticket list.
//!
//! Generation is idempotent per selection: a selection that already holds a
//! ticket is never reissued by `ensure_tickets`. One selection failing does
//! not abort its siblings; the call reports per-selection outcomes so each
//! failure can be retried on its own.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Ticket, TourSelection};

use super::error::{FlowError, FlowResult};
use super::payment;
use super::Journey;

#[derive(Debug, Clone, Serialize)]
pub struct IssuanceOutcome {
    pub selection_id: Uuid,
    pub ticket_id: Option<String>,
    pub already_issued: bool,
    pub error: Option<String>,
}

/// A live ticket resolved to its fan and tour context, for gate scans.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedTicket {
    pub ticket_id: String,
    pub fan_name: String,
    pub fan_email: String,
    pub tour_title: String,
    pub tour_city: String,
    pub tour_venue: String,
    pub generated_at: chrono::DateTime<Utc>,
}

impl Journey {
    /// Generate tickets for every un-ticketed selection of the fan.
    pub async fn ensure_tickets(&self, fan_id: Uuid) -> FlowResult<Vec<IssuanceOutcome>> {
        let lock = self.fan_lock(fan_id).await;
        let _guard = lock.lock().await;

        let fan = self.load_fan(fan_id).await?;
        if !payment::is_consent_reachable(&fan) {
            return Err(FlowError::PaymentRequired);
        }
        if !fan.has_completed_consent {
            return Err(FlowError::ConsentRequired);
        }
        let selections = self.store().selections_for_fan(fan_id).await?;
        if selections.is_empty() {
            return Err(FlowError::NoSelections);
        }

        let mut outcomes = Vec::with_capacity(selections.len());
        for mut selection in selections {
            if selection.has_ticket {
                outcomes.push(IssuanceOutcome {
                    selection_id: selection.id,
                    ticket_id: selection.ticket_id.clone(),
                    already_issued: true,
                    error: None,
                });
                continue;
            }
            match self.issue(&mut selection, true).await {
                Ok(ticket) => outcomes.push(IssuanceOutcome {
                    selection_id: selection.id,
                    ticket_id: Some(ticket.ticket_id),
                    already_issued: false,
                    error: None,
                }),
                Err(FlowError::GenerationFailed { reason, .. }) => {
                    tracing::warn!(
                        selection_id = %selection.id,
                        %reason,
                        "ticket generation failed, selection left retryable"
                    );
                    outcomes.push(IssuanceOutcome {
                        selection_id: selection.id,
                        ticket_id: None,
                        already_issued: false,
                        error: Some(reason),
                    });
                }
                // Storage failures are not per-selection conditions.
                Err(other) => return Err(other),
            }
        }
        Ok(outcomes)
    }

    /// Reissue the ticket for one selection, invalidating the previous
    /// download reference. Same gates as `ensure_tickets`.
    pub async fn regenerate_ticket(&self, selection_id: Uuid) -> FlowResult<Ticket> {
        let selection = self
            .store()
            .selection_by_id(selection_id)
            .await?
            .ok_or(FlowError::NotFound("selection"))?;

        let lock = self.fan_lock(selection.fan_id).await;
        let _guard = lock.lock().await;

        // Re-read under the lock; a concurrent call may have changed it.
        let mut selection = self
            .store()
            .selection_by_id(selection_id)
            .await?
            .ok_or(FlowError::NotFound("selection"))?;
        let fan = self.load_fan(selection.fan_id).await?;
        if !payment::is_consent_reachable(&fan) {
            return Err(FlowError::PaymentRequired);
        }
        if !fan.has_completed_consent {
            return Err(FlowError::ConsentRequired);
        }

        let first_issue = !selection.has_ticket;
        self.issue(&mut selection, first_issue).await
    }

    /// Pure read of the fan's current ticket list; never generates.
    pub async fn downloads(&self, fan_id: Uuid) -> FlowResult<Vec<Ticket>> {
        self.load_fan(fan_id).await?;
        let selections = self.store().selections_for_fan(fan_id).await?;
        let ids: Vec<Uuid> = selections.iter().map(|s| s.id).collect();
        Ok(self.store().tickets_for_selections(&ids).await?)
    }

    /// Resolve a ticket id to its context. Superseded ids no longer
    /// resolve: regeneration replaced their rows.
    pub async fn verify_ticket(&self, ticket_id: &str) -> FlowResult<VerifiedTicket> {
        let ticket = self
            .store()
            .ticket_by_id(ticket_id)
            .await?
            .ok_or(FlowError::NotFound("ticket"))?;
        let selection = self
            .store()
            .selection_by_id(ticket.selection_id)
            .await?
            .ok_or(FlowError::NotFound("selection"))?;
        let fan = self.load_fan(selection.fan_id).await?;
        let tour = self
            .store()
            .tour_by_id(selection.tour_id)
            .await?
            .ok_or(FlowError::NotFound("tour"))?;
        Ok(VerifiedTicket {
            ticket_id: ticket.ticket_id,
            fan_name: fan.name,
            fan_email: fan.email,
            tour_title: tour.title,
            tour_city: tour.city,
            tour_venue: tour.venue,
            generated_at: ticket.generated_at,
        })
    }

    /// Issue one ticket for `selection` with a bounded timeout on the
    /// external generator. On success the selection's ticket fields flip
    /// forward and, for a first issuance, the tour's claim counter is
    /// bumped, all in one atomic write.
    async fn issue(&self, selection: &mut TourSelection, first_issue: bool) -> FlowResult<Ticket> {
        let issued = match tokio::time::timeout(
            self.settings.generation_timeout,
            self.issuer.generate(selection.id),
        )
        .await
        {
            Ok(Ok(issued)) => issued,
            Ok(Err(reason)) => {
                return Err(FlowError::GenerationFailed {
                    selection_id: selection.id,
                    reason,
                })
            }
            Err(_) => {
                return Err(FlowError::GenerationFailed {
                    selection_id: selection.id,
                    reason: "ticket generation timed out".to_string(),
                })
            }
        };

        let ticket = Ticket {
            ticket_id: issued.ticket_id.clone(),
            selection_id: selection.id,
            download_ref: issued.download_ref,
            generated_at: Utc::now(),
        };
        selection.has_ticket = true;
        selection.ticket_id = Some(issued.ticket_id);

        let tour = if first_issue {
            match self.store().tour_by_id(selection.tour_id).await? {
                Some(mut tour) => {
                    tour.tickets_claimed += 1;
                    tour.updated_at = Utc::now();
                    Some(tour)
                }
                None => None,
            }
        } else {
            None
        };
        self.store()
            .write_issuance(selection, &ticket, tour.as_ref())
            .await?;
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::domain::consent::ConsentSubmission;
    use crate::domain::{Journey, JourneySettings};
    use crate::services::{IssuedTicket, LocalPhotoVault, StoreCatalog, TicketIssuer};
    use crate::store::memory::MemoryStore;
    use crate::store::FanStore;

    use super::super::support;
    use super::*;

    fn submission() -> ConsentSubmission {
        ConsentSubmission {
            agreed_to_terms: true,
            agreed_to_privacy: true,
            agreed_to_marketing: false,
            age_verified: true,
            date_of_birth: None,
            confirmed_name: "Ada Obi".to_string(),
            confirmed_email: "ada@example.com".to_string(),
            confirmed_phone: None,
            signature_name: "Ada Obi".to_string(),
        }
    }

    async fn complete_consent(journey: &Journey, fan_id: Uuid) {
        journey.mark_fan_verified(fan_id).await.unwrap();
        journey.submit_consent(fan_id, submission()).await.unwrap();
    }

    fn journey_with_issuer(
        issuer: Arc<dyn TicketIssuer>,
        settings: JourneySettings,
    ) -> (Journey, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let catalog = Arc::new(StoreCatalog::new(store.clone() as Arc<dyn FanStore>));
        let journey = Journey::new(
            store.clone(),
            catalog,
            issuer,
            Arc::new(LocalPhotoVault::new("/tmp/vipfan-test-uploads")),
            settings,
        );
        (journey, store)
    }

    #[tokio::test]
    async fn gates_are_checked_before_any_generation() {
        let (journey, store) = support::journey();
        let fan = support::register(&journey).await;
        let tour = support::seed_tour(&store, 100, true).await;
        journey.select_tour(fan.id, tour.id).await.unwrap();

        let err = journey.ensure_tickets(fan.id).await.unwrap_err();
        assert!(matches!(err, FlowError::PaymentRequired));

        journey.mark_fan_verified(fan.id).await.unwrap();
        let err = journey.ensure_tickets(fan.id).await.unwrap_err();
        assert!(matches!(err, FlowError::ConsentRequired));
    }

    #[tokio::test]
    async fn no_selections_is_its_own_error() {
        let (journey, _store) = support::journey();
        let fan = support::register(&journey).await;
        complete_consent(&journey, fan.id).await;

        let err = journey.ensure_tickets(fan.id).await.unwrap_err();
        assert!(matches!(err, FlowError::NoSelections));
    }

    #[tokio::test]
    async fn ensure_tickets_is_idempotent_per_selection() {
        let (journey, store) = support::journey();
        let fan = support::register(&journey).await;
        let first = support::seed_tour(&store, 100, true).await;
        let second = support::seed_tour(&store, 100, true).await;
        journey.select_tour(fan.id, first.id).await.unwrap();
        journey.select_tour(fan.id, second.id).await.unwrap();
        complete_consent(&journey, fan.id).await;

        let outcomes = journey.ensure_tickets(fan.id).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        let ids: Vec<String> = outcomes
            .iter()
            .map(|o| o.ticket_id.clone().unwrap())
            .collect();
        assert_ne!(ids[0], ids[1], "each selection gets its own ticket");

        // Second call reissues nothing and reports the same ids.
        let again = journey.ensure_tickets(fan.id).await.unwrap();
        assert!(again.iter().all(|o| o.already_issued));
        let ids_again: Vec<String> = again
            .iter()
            .map(|o| o.ticket_id.clone().unwrap())
            .collect();
        assert_eq!(ids, ids_again);

        // First issuance claimed one ticket per tour, once.
        let tour = store.tour_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(tour.tickets_claimed, 1);
    }

    #[tokio::test]
    async fn one_failing_selection_does_not_abort_siblings() {
        struct FlakyIssuer {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl TicketIssuer for FlakyIssuer {
            async fn generate(&self, _selection_id: Uuid) -> Result<IssuedTicket, String> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err("printer on fire".to_string())
                } else {
                    Ok(IssuedTicket {
                        ticket_id: format!("TKT-TEST-{}", Uuid::new_v4().simple()),
                        download_ref: "/api/tickets/download/test".to_string(),
                    })
                }
            }
        }

        let (journey, store) = journey_with_issuer(
            Arc::new(FlakyIssuer {
                calls: AtomicUsize::new(0),
            }),
            JourneySettings::default(),
        );
        let fan = support::register(&journey).await;
        let first = support::seed_tour(&store, 100, true).await;
        let second = support::seed_tour(&store, 100, true).await;
        journey.select_tour(fan.id, first.id).await.unwrap();
        journey.select_tour(fan.id, second.id).await.unwrap();
        complete_consent(&journey, fan.id).await;

        let outcomes = journey.ensure_tickets(fan.id).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].error.is_some());
        assert!(outcomes[1].ticket_id.is_some());

        // The failed selection is retryable: the next pass issues it and
        // leaves the succeeded one alone.
        let retry = journey.ensure_tickets(fan.id).await.unwrap();
        assert!(retry[0].ticket_id.is_some());
        assert!(retry[1].already_issued);
    }

    #[tokio::test(start_paused = true)]
    async fn generation_timeout_leaves_the_selection_retryable() {
        struct StuckIssuer;

        #[async_trait]
        impl TicketIssuer for StuckIssuer {
            async fn generate(&self, _selection_id: Uuid) -> Result<IssuedTicket, String> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("issuer never returns in time");
            }
        }

        let (journey, store) = journey_with_issuer(
            Arc::new(StuckIssuer),
            JourneySettings {
                generation_timeout: Duration::from_millis(50),
                ..JourneySettings::default()
            },
        );
        let fan = support::register(&journey).await;
        let tour = support::seed_tour(&store, 100, true).await;
        journey.select_tour(fan.id, tour.id).await.unwrap();
        complete_consent(&journey, fan.id).await;

        let outcomes = journey.ensure_tickets(fan.id).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].error.is_some());

        let selection = store
            .selection_by_id(outcomes[0].selection_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!selection.has_ticket);
    }

    #[tokio::test]
    async fn regenerate_replaces_only_that_selection() {
        let (journey, store) = support::journey();
        let fan = support::register(&journey).await;
        let first = support::seed_tour(&store, 100, true).await;
        let second = support::seed_tour(&store, 100, true).await;
        let kept = journey.select_tour(fan.id, first.id).await.unwrap();
        let target = journey.select_tour(fan.id, second.id).await.unwrap();
        complete_consent(&journey, fan.id).await;
        journey.ensure_tickets(fan.id).await.unwrap();

        let before = journey.downloads(fan.id).await.unwrap();
        let old_target_id = before
            .iter()
            .find(|t| t.selection_id == target.id)
            .unwrap()
            .ticket_id
            .clone();
        let kept_id = before
            .iter()
            .find(|t| t.selection_id == kept.id)
            .unwrap()
            .ticket_id
            .clone();

        let reissued = journey.regenerate_ticket(target.id).await.unwrap();
        assert_ne!(reissued.ticket_id, old_target_id);

        let after = journey.downloads(fan.id).await.unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.iter().any(|t| t.ticket_id == kept_id));
        assert!(after.iter().any(|t| t.ticket_id == reissued.ticket_id));

        // The superseded id no longer resolves.
        let err = journey.verify_ticket(&old_target_id).await.unwrap_err();
        assert!(matches!(err, FlowError::NotFound("ticket")));
        journey.verify_ticket(&reissued.ticket_id).await.unwrap();

        // Regeneration does not double-claim tour capacity.
        let tour = store.tour_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(tour.tickets_claimed, 1);
    }

    #[tokio::test]
    async fn downloads_is_a_pure_read() {
        let (journey, store) = support::journey();
        let fan = support::register(&journey).await;
        let tour = support::seed_tour(&store, 100, true).await;
        journey.select_tour(fan.id, tour.id).await.unwrap();
        complete_consent(&journey, fan.id).await;

        // Nothing issued yet, and asking for downloads issues nothing.
        assert!(journey.downloads(fan.id).await.unwrap().is_empty());
        assert!(journey.downloads(fan.id).await.unwrap().is_empty());
    }
}
