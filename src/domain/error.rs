//! Typed failures of the fan journey state machine.
//!
//! Gate and precondition failures are returned values, never panics, so the
//! HTTP layer can render them as user guidance.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Field-keyed validation failures. Ordered map so responses are stable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    /// A caller bug: an attempted write that would break a core invariant
    /// (count outside 0..=5, reverting a monotonic flag). Never expected in
    /// normal operation.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("selection cap reached ({current} of {max})")]
    CapacityExceeded { current: i32, max: i32 },

    #[error("tour {tour_id} already selected")]
    DuplicateSelection { tour_id: Uuid },

    #[error("tour {tour_id} is not available: {reason}")]
    TourUnavailable { tour_id: Uuid, reason: String },

    /// Selections are frozen once consent is complete.
    #[error("selections cannot change after consent is completed")]
    ImmutableAfterConsent,

    /// Payment verification has not happened; consent and tickets are
    /// unreachable until an administrator flips `is_verified`.
    #[error("payment verification required")]
    PaymentRequired,

    #[error("consent must be completed before tickets are generated")]
    ConsentRequired,

    #[error("no tour selections found")]
    NoSelections,

    #[error("validation failed")]
    ValidationFailed(ValidationErrors),

    /// Consent is already complete; resubmission is rejected, not replayed.
    #[error("consent already completed")]
    AlreadyComplete,

    /// Per-selection, retryable issuance failure. Sibling selections are
    /// unaffected.
    #[error("ticket generation failed for selection {selection_id}: {reason}")]
    GenerationFailed { selection_id: Uuid, reason: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("storage error")]
    Storage(#[from] StoreError),
}

impl FlowError {
    /// Stable machine-readable code for the API envelope.
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            FlowError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            FlowError::DuplicateSelection { .. } => "DUPLICATE_SELECTION",
            FlowError::TourUnavailable { .. } => "TOUR_UNAVAILABLE",
            FlowError::ImmutableAfterConsent => "IMMUTABLE_AFTER_CONSENT",
            FlowError::PaymentRequired => "PAYMENT_REQUIRED",
            FlowError::ConsentRequired => "CONSENT_REQUIRED",
            FlowError::NoSelections => "NO_SELECTIONS",
            FlowError::ValidationFailed(_) => "VALIDATION_FAILED",
            FlowError::AlreadyComplete => "ALREADY_COMPLETE",
            FlowError::GenerationFailed { .. } => "GENERATION_FAILED",
            FlowError::NotFound(_) => "NOT_FOUND",
            FlowError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

pub type FlowResult<T> = Result<T, FlowError>;
