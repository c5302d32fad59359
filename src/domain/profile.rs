//! FanProfile store: the authoritative status snapshot for one fan.
//!
//! Writes go through `ProfilePatch`, which encodes field ownership in the
//! type: the payment side channel may only touch `is_verified`, the consent
//! gate only `has_completed_consent`, the selection manager only the
//! selection counters.

use chrono::Utc;
use uuid::Uuid;

use crate::models::Fan;

use super::error::{FlowError, FlowResult};
use super::Journey;

#[derive(Debug, Clone, Copy)]
pub enum ProfilePatch {
    /// Payment verification flag; flipped by an external administrative
    /// action, never by the fan-facing flow.
    Payment { is_verified: bool },
    /// Consent completion flag, owned by the consent gate.
    Consent { has_completed_consent: bool },
    /// Selection count, owned by the selection manager. Also refreshes
    /// `can_select_more_tours`.
    Selections { count: i32 },
}

/// Merge a patch into the fan snapshot, enforcing monotonicity of the
/// status flags and the 0..=max selection bound.
pub fn apply_patch(fan: &mut Fan, patch: ProfilePatch, max_tours: i32) -> FlowResult<()> {
    match patch {
        ProfilePatch::Payment { is_verified } => {
            if fan.is_verified && !is_verified {
                return Err(FlowError::InvariantViolation(
                    "is_verified cannot revert to false".to_string(),
                ));
            }
            fan.is_verified = is_verified;
        }
        ProfilePatch::Consent {
            has_completed_consent,
        } => {
            if fan.has_completed_consent && !has_completed_consent {
                return Err(FlowError::InvariantViolation(
                    "has_completed_consent cannot revert to false".to_string(),
                ));
            }
            fan.has_completed_consent = has_completed_consent;
        }
        ProfilePatch::Selections { count } => {
            if count < 0 || count > max_tours {
                return Err(FlowError::InvariantViolation(format!(
                    "selection count {count} outside 0..={max_tours}"
                )));
            }
            fan.selections_count = count;
            fan.can_select_more_tours = count < max_tours;
        }
    }
    fan.updated_at = Utc::now();
    Ok(())
}

impl Journey {
    /// Load, patch and persist one fan's profile.
    pub async fn apply_profile_patch(&self, fan_id: Uuid, patch: ProfilePatch) -> FlowResult<Fan> {
        let lock = self.fan_lock(fan_id).await;
        let _guard = lock.lock().await;
        let mut fan = self.load_fan(fan_id).await?;
        apply_patch(&mut fan, patch, self.max_tours_per_fan())?;
        self.store().update_fan(&fan).await?;
        Ok(fan)
    }

    /// Administrative side channel: mark a fan's payment as verified.
    pub async fn mark_fan_verified(&self, fan_id: Uuid) -> FlowResult<Fan> {
        let fan = self
            .apply_profile_patch(fan_id, ProfilePatch::Payment { is_verified: true })
            .await?;
        tracing::info!(fan_id = %fan.id, "fan marked as payment-verified");
        Ok(fan)
    }
}
