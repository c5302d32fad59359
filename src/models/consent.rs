use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A fan's legal consent record, one per fan. Created only by a successful
/// consent submission and immutable once `is_complete`, except for the
/// photo-ID fields which ride a best-effort side channel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsentRecord {
    pub id: Uuid,
    pub fan_id: Uuid,
    pub agreed_to_terms: bool,
    pub agreed_to_privacy: bool,
    pub agreed_to_marketing: bool,
    pub age_verified: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub confirmed_name: String,
    pub confirmed_email: String,
    pub confirmed_phone: Option<String>,
    pub signature_name: String,
    pub photo_id_uploaded: bool,
    pub photo_id_path: Option<String>,
    pub is_complete: bool,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
