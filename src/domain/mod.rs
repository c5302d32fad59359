//! The fan journey state machine.
//!
//! All gating decisions read one `Fan` snapshot; each manager writes only
//! the attributes it owns, through `ProfilePatch`. Mutations for a given
//! fan are serialized by a per-fan async mutex; gate predicates are pure
//! reads and run unsynchronized.

pub mod consent;
pub mod error;
pub mod payment;
pub mod profile;
pub mod selections;
pub mod tickets;
pub mod tours;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::Fan;
use crate::services::{PhotoVault, TicketIssuer, TourCatalog};
use crate::store::FanStore;
use crate::utils::validators::{generate_registration_code, is_valid_email, is_valid_phone};

pub use error::{FlowError, FlowResult, ValidationErrors};
pub use profile::ProfilePatch;

const CODE_ISSUE_ATTEMPTS: u32 = 16;

#[derive(Debug, Clone)]
pub struct JourneySettings {
    pub max_tours_per_fan: i32,
    pub generation_timeout: Duration,
}

impl Default for JourneySettings {
    fn default() -> Self {
        Self {
            max_tours_per_fan: 5,
            generation_timeout: Duration::from_secs(10),
        }
    }
}

/// The journey service: owns the store, the external collaborators and the
/// per-fan serialization of mutating operations.
pub struct Journey {
    store: Arc<dyn FanStore>,
    catalog: Arc<dyn TourCatalog>,
    issuer: Arc<dyn TicketIssuer>,
    vault: Arc<dyn PhotoVault>,
    settings: JourneySettings,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFan {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Journey {
    pub fn new(
        store: Arc<dyn FanStore>,
        catalog: Arc<dyn TourCatalog>,
        issuer: Arc<dyn TicketIssuer>,
        vault: Arc<dyn PhotoVault>,
        settings: JourneySettings,
    ) -> Self {
        Self {
            store,
            catalog,
            issuer,
            vault,
            settings,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn store(&self) -> &dyn FanStore {
        self.store.as_ref()
    }

    pub(crate) fn max_tours_per_fan(&self) -> i32 {
        self.settings.max_tours_per_fan
    }

    /// Handle for the per-fan mutex. Held across read-then-write mutations
    /// so retried or duplicated calls cannot interleave for one fan.
    /// Entries no one else holds are evicted here, keeping the map bounded
    /// by the number of fans with an operation in flight.
    pub(crate) async fn fan_lock(&self, fan_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.retain(|id, lock| *id == fan_id || Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(fan_id).or_default())
    }

    pub(crate) async fn load_fan(&self, fan_id: Uuid) -> FlowResult<Fan> {
        self.store
            .fan_by_id(fan_id)
            .await?
            .ok_or(FlowError::NotFound("fan"))
    }

    /// Register a new fan: validate input, reject duplicate emails, issue a
    /// unique `VIP-XXXXXXXX` registration code.
    pub async fn register_fan(&self, new_fan: NewFan) -> FlowResult<Fan> {
        let name = new_fan.name.trim().to_string();
        let email = new_fan.email.trim().to_string();
        let phone = new_fan
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let mut errors = ValidationErrors::new();
        if name.split_whitespace().count() < 2 {
            errors.add("name", "provide your full name (first and last name)");
        }
        if !is_valid_email(&email) {
            errors.add("email", "enter a valid email address");
        }
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                errors.add("phone", "phone number must contain 10-15 digits");
            }
        }
        if !errors.is_empty() {
            return Err(FlowError::ValidationFailed(errors));
        }

        if self.store.fan_by_email(&email).await?.is_some() {
            return Err(FlowError::ValidationFailed(ValidationErrors::single(
                "email",
                "email already registered",
            )));
        }

        let code = self.issue_registration_code().await?;
        let fan = Fan::new(code, name, email, phone);
        self.store.insert_fan(&fan).await?;
        tracing::info!(fan_id = %fan.id, code = %fan.registration_code, "fan registered");
        Ok(fan)
    }

    pub async fn fan(&self, fan_id: Uuid) -> FlowResult<Fan> {
        self.load_fan(fan_id).await
    }

    pub async fn fan_by_code(&self, code: &str) -> FlowResult<Fan> {
        self.store
            .fan_by_code(code)
            .await?
            .ok_or(FlowError::NotFound("fan"))
    }

    pub async fn fan_by_email(&self, email: &str) -> FlowResult<Fan> {
        self.store
            .fan_by_email(email)
            .await?
            .ok_or(FlowError::NotFound("fan"))
    }

    async fn issue_registration_code(&self) -> FlowResult<String> {
        // Issuance retries on the (vanishingly rare) collision; the code
        // format itself is validated where codes enter from outside.
        for _ in 0..CODE_ISSUE_ATTEMPTS {
            let code = generate_registration_code();
            if self.store.fan_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(FlowError::InvariantViolation(
            "registration code space exhausted".to_string(),
        ))
    }
}
