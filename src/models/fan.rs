use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered fan. Identified externally by `registration_code`
/// (format `VIP-` + 8 uppercase alphanumerics).
///
/// `is_verified` and `has_completed_consent` are monotonic: once true they
/// never revert. `selections_count` and `can_select_more_tours` are
/// maintained alongside selection mutations, never recomputed ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fan {
    pub id: Uuid,
    pub registration_code: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub has_completed_consent: bool,
    pub selections_count: i32,
    pub can_select_more_tours: bool,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fan {
    pub fn new(registration_code: String, name: String, email: String, phone: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            registration_code,
            name,
            email,
            phone,
            is_verified: false,
            has_completed_consent: false,
            selections_count: 0,
            can_select_more_tours: true,
            registered_at: now,
            updated_at: now,
        }
    }
}
