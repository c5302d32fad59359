//! ConsentGate: the fan's consent lifecycle.
//!
//! `NotStarted → Complete` through one validated submission. A failed
//! validation mutates nothing and may be retried; a completed consent
//! cannot be edited or resubmitted through this flow.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ConsentRecord;
use crate::utils::validators::{age_in_years, is_valid_email, is_valid_phone};

use super::error::{FlowError, FlowResult, ValidationErrors};
use super::payment;
use super::profile::{apply_patch, ProfilePatch};
use super::Journey;

const MIN_AGE: i32 = 18;

#[derive(Debug, Clone, Deserialize)]
pub struct ConsentSubmission {
    pub agreed_to_terms: bool,
    pub agreed_to_privacy: bool,
    #[serde(default)]
    pub agreed_to_marketing: bool,
    pub age_verified: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub confirmed_name: String,
    pub confirmed_email: String,
    pub confirmed_phone: Option<String>,
    pub signature_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsentStatus {
    pub fan_id: Uuid,
    pub consent_submitted: bool,
    pub consent_complete: bool,
    pub tickets_unlocked: bool,
    pub photo_id_uploaded: bool,
}

/// Outcome of the best-effort photo-ID side channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhotoIdOutcome {
    Stored { path: String },
    Failed { warning: String },
}

fn validate(submission: &ConsentSubmission) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !submission.agreed_to_terms {
        errors.add("agreed_to_terms", "you must agree to the terms and conditions");
    }
    if !submission.agreed_to_privacy {
        errors.add("agreed_to_privacy", "you must agree to the privacy policy");
    }
    if !submission.age_verified {
        errors.add("age_verified", "you must confirm you are 18 or older");
    }
    // When a date of birth is supplied it must agree with the checkbox;
    // both checks have to pass.
    if let Some(dob) = submission.date_of_birth {
        if age_in_years(dob) < MIN_AGE {
            errors.add("date_of_birth", "you must be at least 18 years old");
        }
    }
    if submission.confirmed_name.trim().split_whitespace().count() < 2 {
        errors.add("confirmed_name", "provide your full name (first and last name)");
    }
    if !is_valid_email(submission.confirmed_email.trim()) {
        errors.add("confirmed_email", "enter a valid email address");
    }
    if let Some(phone) = submission
        .confirmed_phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        if !is_valid_phone(phone) {
            errors.add("confirmed_phone", "phone number must contain 10-15 digits");
        }
    }
    if submission.signature_name.trim().is_empty() {
        errors.add("signature_name", "a typed signature is required");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Journey {
    /// Submit the consent form. Gated on payment verification; validation
    /// failures mutate nothing; success persists the record and flips the
    /// fan's `has_completed_consent` in the same transaction.
    pub async fn submit_consent(
        &self,
        fan_id: Uuid,
        submission: ConsentSubmission,
    ) -> FlowResult<ConsentRecord> {
        let lock = self.fan_lock(fan_id).await;
        let _guard = lock.lock().await;

        let mut fan = self.load_fan(fan_id).await?;
        if !payment::is_consent_reachable(&fan) {
            return Err(FlowError::PaymentRequired);
        }
        if let Some(existing) = self.store().consent_for_fan(fan_id).await? {
            if existing.is_complete {
                return Err(FlowError::AlreadyComplete);
            }
        }
        validate(&submission).map_err(FlowError::ValidationFailed)?;

        let now = Utc::now();
        let record = ConsentRecord {
            id: Uuid::new_v4(),
            fan_id,
            agreed_to_terms: submission.agreed_to_terms,
            agreed_to_privacy: submission.agreed_to_privacy,
            agreed_to_marketing: submission.agreed_to_marketing,
            age_verified: submission.age_verified,
            date_of_birth: submission.date_of_birth,
            confirmed_name: submission.confirmed_name.trim().to_string(),
            confirmed_email: submission.confirmed_email.trim().to_string(),
            confirmed_phone: submission
                .confirmed_phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            signature_name: submission.signature_name.trim().to_string(),
            photo_id_uploaded: false,
            photo_id_path: None,
            is_complete: true,
            signed_at: Some(now),
            created_at: now,
        };
        apply_patch(
            &mut fan,
            ProfilePatch::Consent {
                has_completed_consent: true,
            },
            self.max_tours_per_fan(),
        )?;
        self.store().write_consent(&fan, &record).await?;
        tracing::info!(fan_id = %fan_id, "consent completed, tickets unlocked");
        Ok(record)
    }

    pub async fn consent_for_fan(&self, fan_id: Uuid) -> FlowResult<ConsentRecord> {
        self.load_fan(fan_id).await?;
        self.store()
            .consent_for_fan(fan_id)
            .await?
            .ok_or(FlowError::NotFound("consent"))
    }

    pub async fn consent_status(&self, fan_id: Uuid) -> FlowResult<ConsentStatus> {
        let fan = self.load_fan(fan_id).await?;
        let consent = self.store().consent_for_fan(fan_id).await?;
        Ok(ConsentStatus {
            fan_id,
            consent_submitted: consent.is_some(),
            consent_complete: consent.as_ref().is_some_and(|c| c.is_complete),
            tickets_unlocked: fan.has_completed_consent,
            photo_id_uploaded: consent.as_ref().is_some_and(|c| c.photo_id_uploaded),
        })
    }

    /// Attach an uploaded photo ID to an existing consent record. Vault
    /// failures are swallowed into a warning; they never fail the consent
    /// flow itself.
    pub async fn attach_photo_id(
        &self,
        fan_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> FlowResult<PhotoIdOutcome> {
        let lock = self.fan_lock(fan_id).await;
        let _guard = lock.lock().await;

        let mut consent = self.consent_for_fan(fan_id).await?;
        match self.vault.store(fan_id, filename, bytes).await {
            Ok(path) => {
                consent.photo_id_uploaded = true;
                consent.photo_id_path = Some(path.clone());
                self.store().update_consent(&consent).await?;
                Ok(PhotoIdOutcome::Stored { path })
            }
            Err(warning) => {
                tracing::warn!(fan_id = %fan_id, %warning, "photo id upload failed");
                Ok(PhotoIdOutcome::Failed { warning })
            }
        }
    }
}
