//! End-to-end journey tests over the in-memory store: registration through
//! selection, payment verification, consent and ticket download.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use vipfan_server::domain::consent::ConsentSubmission;
use vipfan_server::domain::{FlowError, Journey, JourneySettings, NewFan};
use vipfan_server::models::{Fan, Tour};
use vipfan_server::services::{LocalIssuer, LocalPhotoVault, StoreCatalog};
use vipfan_server::store::memory::MemoryStore;
use vipfan_server::store::FanStore;

fn journey() -> (Journey, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(StoreCatalog::new(store.clone() as Arc<dyn FanStore>));
    let journey = Journey::new(
        store.clone(),
        catalog,
        Arc::new(LocalIssuer),
        Arc::new(LocalPhotoVault::new("/tmp/vipfan-flow-uploads")),
        JourneySettings::default(),
    );
    (journey, store)
}

async fn register(journey: &Journey) -> Fan {
    journey
        .register_fan(NewFan {
            name: "Ada Obi".to_string(),
            email: format!("fan-{}@example.com", Uuid::new_v4()),
            phone: Some("08012345678".to_string()),
        })
        .await
        .expect("registration should succeed")
}

async fn seed_tour(store: &MemoryStore, limit: i32) -> Tour {
    let now = Utc::now();
    let tour = Tour {
        id: Uuid::new_v4(),
        title: "Echo World Tour".to_string(),
        date: now,
        city: "Lagos".to_string(),
        venue: "Eko Arena".to_string(),
        artists: "Echo".to_string(),
        ticket_limit: limit,
        tickets_claimed: 0,
        is_active: true,
        description: None,
        image_url: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_tour(&tour).await.expect("seed tour");
    tour
}

fn consent_submission() -> ConsentSubmission {
    ConsentSubmission {
        agreed_to_terms: true,
        agreed_to_privacy: true,
        agreed_to_marketing: true,
        age_verified: true,
        date_of_birth: None,
        confirmed_name: "Ada Obi".to_string(),
        confirmed_email: "ada@example.com".to_string(),
        confirmed_phone: None,
        signature_name: "Ada Obi".to_string(),
    }
}

#[tokio::test]
async fn happy_path_from_registration_to_download() {
    let (journey, store) = journey();

    let fan = register(&journey).await;
    assert!(fan.registration_code.starts_with("VIP-"));
    assert!(!fan.is_verified);

    let first = seed_tour(&store, 100).await;
    let second = seed_tour(&store, 100).await;
    journey.select_tour(fan.id, first.id).await.unwrap();
    journey.select_tour(fan.id, second.id).await.unwrap();

    let snapshot = journey.fan(fan.id).await.unwrap();
    assert_eq!(snapshot.selections_count, 2);
    assert!(snapshot.can_select_more_tours);

    journey.mark_fan_verified(fan.id).await.unwrap();
    journey
        .submit_consent(fan.id, consent_submission())
        .await
        .unwrap();

    let outcomes = journey.ensure_tickets(fan.id).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.ticket_id.is_some()));

    let tickets = journey.downloads(fan.id).await.unwrap();
    assert_eq!(tickets.len(), 2);
    for ticket in &tickets {
        assert!(ticket.ticket_id.starts_with("TKT-"));
        let verified = journey.verify_ticket(&ticket.ticket_id).await.unwrap();
        assert_eq!(verified.fan_email, snapshot.email);
    }

    // Each tour gave up exactly one ticket.
    assert_eq!(
        store.tour_by_id(first.id).await.unwrap().unwrap().tickets_claimed,
        1
    );
}

#[tokio::test]
async fn gates_enforce_the_step_order() {
    let (journey, store) = journey();
    let fan = register(&journey).await;
    let tour = seed_tour(&store, 100).await;
    journey.select_tour(fan.id, tour.id).await.unwrap();

    // Consent before payment verification.
    let err = journey
        .submit_consent(fan.id, consent_submission())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::PaymentRequired));

    // Tickets before consent.
    journey.mark_fan_verified(fan.id).await.unwrap();
    let err = journey.ensure_tickets(fan.id).await.unwrap_err();
    assert!(matches!(err, FlowError::ConsentRequired));

    // In order, everything goes through.
    journey
        .submit_consent(fan.id, consent_submission())
        .await
        .unwrap();
    journey.ensure_tickets(fan.id).await.unwrap();
}

#[tokio::test]
async fn selections_freeze_once_consent_is_complete() {
    let (journey, store) = journey();
    let fan = register(&journey).await;
    let held = seed_tour(&store, 100).await;
    let other = seed_tour(&store, 100).await;
    let selection = journey.select_tour(fan.id, held.id).await.unwrap();

    journey.mark_fan_verified(fan.id).await.unwrap();
    journey
        .submit_consent(fan.id, consent_submission())
        .await
        .unwrap();

    let err = journey.select_tour(fan.id, other.id).await.unwrap_err();
    assert!(matches!(err, FlowError::ImmutableAfterConsent));
    let err = journey.deselect_tour(fan.id, selection.id).await.unwrap_err();
    assert!(matches!(err, FlowError::ImmutableAfterConsent));
    let err = journey
        .replace_selections(fan.id, vec![other.id])
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::ImmutableAfterConsent));

    assert_eq!(journey.selections(fan.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sold_out_tours_stop_accepting_fans() {
    let (journey, store) = journey();
    let tour = seed_tour(&store, 1).await;

    let first = register(&journey).await;
    journey.select_tour(first.id, tour.id).await.unwrap();
    journey.mark_fan_verified(first.id).await.unwrap();
    journey
        .submit_consent(first.id, consent_submission())
        .await
        .unwrap();
    journey.ensure_tickets(first.id).await.unwrap();

    // The single ticket is claimed; the next fan is turned away.
    let second = register(&journey).await;
    let err = journey.select_tour(second.id, tour.id).await.unwrap_err();
    assert!(matches!(err, FlowError::TourUnavailable { .. }));
}

#[tokio::test]
async fn regeneration_supersedes_the_previous_ticket() {
    let (journey, store) = journey();
    let fan = register(&journey).await;
    let tour = seed_tour(&store, 100).await;
    let selection = journey.select_tour(fan.id, tour.id).await.unwrap();
    journey.mark_fan_verified(fan.id).await.unwrap();
    journey
        .submit_consent(fan.id, consent_submission())
        .await
        .unwrap();

    let outcomes = journey.ensure_tickets(fan.id).await.unwrap();
    let original_id = outcomes[0].ticket_id.clone().unwrap();

    let reissued = journey.regenerate_ticket(selection.id).await.unwrap();
    assert_ne!(reissued.ticket_id, original_id);

    assert!(journey.verify_ticket(&original_id).await.is_err());
    journey.verify_ticket(&reissued.ticket_id).await.unwrap();

    let tickets = journey.downloads(fan.id).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].ticket_id, reissued.ticket_id);
}

#[tokio::test]
async fn lookup_by_code_matches_registration() {
    let (journey, _store) = journey();
    let fan = register(&journey).await;

    let found = journey.fan_by_code(&fan.registration_code).await.unwrap();
    assert_eq!(found.id, fan.id);

    let err = journey.fan_by_code("VIP-NOSUCHFN").await.unwrap_err();
    assert!(matches!(err, FlowError::NotFound("fan")));
}
