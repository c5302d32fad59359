use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A concert tour open for VIP selection, with a finite ticket capacity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tour {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub city: String,
    pub venue: String,
    pub artists: String,
    pub ticket_limit: i32,
    pub tickets_claimed: i32,
    pub is_active: bool,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tour {
    pub fn tickets_remaining(&self) -> i32 {
        (self.ticket_limit - self.tickets_claimed).max(0)
    }

    pub fn is_available(&self) -> bool {
        self.is_active && self.tickets_remaining() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tour(limit: i32, claimed: i32, active: bool) -> Tour {
        let now = Utc::now();
        Tour {
            id: Uuid::new_v4(),
            title: "World Tour".to_string(),
            date: now,
            city: "Lagos".to_string(),
            venue: "Eko Arena".to_string(),
            artists: "Headliner".to_string(),
            ticket_limit: limit,
            tickets_claimed: claimed,
            is_active: active,
            description: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(tour(10, 12, true).tickets_remaining(), 0);
        assert_eq!(tour(10, 3, true).tickets_remaining(), 7);
    }

    #[test]
    fn availability_requires_active_and_capacity() {
        assert!(tour(10, 9, true).is_available());
        assert!(!tour(10, 10, true).is_available());
        assert!(!tour(10, 0, false).is_available());
    }
}
