//! Consent submission, status and the photo-ID upload side channel.

use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::domain::consent::ConsentSubmission;
use crate::domain::{FlowError, ValidationErrors};
use crate::utils::response::success;

use super::AppState;

pub async fn submit_consent(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
    Json(submission): Json<ConsentSubmission>,
) -> Result<Response, FlowError> {
    let record = state.journey.submit_consent(fan_id, submission).await?;
    Ok(success(record, "Consent completed"))
}

pub async fn consent_status(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
) -> Result<Response, FlowError> {
    let status = state.journey.consent_status(fan_id).await?;
    Ok(success(status, "Consent status retrieved"))
}

/// Accepts a multipart upload with a single `photo_id` file field. Storage
/// failures come back as a success with a warning payload; only a missing
/// or unreadable file is a client error.
pub async fn upload_photo_id(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Response, FlowError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        FlowError::ValidationFailed(ValidationErrors::single(
            "photo_id",
            format!("unreadable upload: {e}"),
        ))
    })? {
        if field.name() != Some("photo_id") {
            continue;
        }
        let filename = field.file_name().unwrap_or("photo_id").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            FlowError::ValidationFailed(ValidationErrors::single(
                "photo_id",
                format!("unreadable upload: {e}"),
            ))
        })?;
        let outcome = state
            .journey
            .attach_photo_id(fan_id, &filename, &bytes)
            .await?;
        return Ok(success(outcome, "Photo ID processed"));
    }

    Err(FlowError::ValidationFailed(ValidationErrors::single(
        "photo_id",
        "a photo_id file field is required",
    )))
}
