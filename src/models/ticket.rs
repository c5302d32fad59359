use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A generated ticket. At most one live ticket exists per selection;
/// regeneration replaces the row, so a superseded `ticket_id` stops
/// resolving and its download reference is dead.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub ticket_id: String,
    pub selection_id: Uuid,
    pub download_ref: String,
    pub generated_at: DateTime<Utc>,
}
