use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One fan-to-tour binding. Per fan the set of `tour_id`s is unique and its
/// size never exceeds the configured cap. `has_ticket`/`ticket_id` only
/// move forward (false → true, id replaced only by regeneration).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TourSelection {
    pub id: Uuid,
    pub fan_id: Uuid,
    pub tour_id: Uuid,
    pub has_ticket: bool,
    pub ticket_id: Option<String>,
    pub selected_at: DateTime<Utc>,
}

impl TourSelection {
    pub fn new(fan_id: Uuid, tour_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            fan_id,
            tour_id,
            has_ticket: false,
            ticket_id: None,
            selected_at: Utc::now(),
        }
    }
}
