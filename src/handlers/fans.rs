//! Registration, fan lookup and the selection endpoints.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{FlowError, NewFan, ValidationErrors};
use crate::utils::response::{created, empty_success, success};
use crate::utils::validators::is_valid_registration_code;

use super::AppState;

#[derive(Deserialize)]
pub struct SelectTourBody {
    pub tour_id: Uuid,
}

#[derive(Deserialize)]
pub struct ReplaceSelectionsBody {
    pub tour_ids: Vec<Uuid>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(new_fan): Json<NewFan>,
) -> Result<Response, FlowError> {
    let fan = state.journey.register_fan(new_fan).await?;
    Ok(created(fan, "Registration successful"))
}

pub async fn get_fan(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
) -> Result<Response, FlowError> {
    let fan = state.journey.fan(fan_id).await?;
    Ok(success(fan, "Fan found"))
}

pub async fn get_fan_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, FlowError> {
    let code = code.trim().to_uppercase();
    if !is_valid_registration_code(&code) {
        return Err(FlowError::ValidationFailed(ValidationErrors::single(
            "code",
            "registration code must look like VIP-XXXXXXXX",
        )));
    }
    let fan = state.journey.fan_by_code(&code).await?;
    Ok(success(fan, "Fan found"))
}

pub async fn get_fan_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Response, FlowError> {
    let fan = state.journey.fan_by_email(email.trim()).await?;
    Ok(success(fan, "Fan found"))
}

pub async fn list_selections(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
) -> Result<Response, FlowError> {
    let selections = state.journey.selections(fan_id).await?;
    Ok(success(selections, "Selections retrieved"))
}

pub async fn select_tour(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
    Json(body): Json<SelectTourBody>,
) -> Result<Response, FlowError> {
    let selection = state.journey.select_tour(fan_id, body.tour_id).await?;
    Ok(created(selection, "Tour selected"))
}

pub async fn replace_selections(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
    Json(body): Json<ReplaceSelectionsBody>,
) -> Result<Response, FlowError> {
    let selections = state
        .journey
        .replace_selections(fan_id, body.tour_ids)
        .await?;
    Ok(success(selections, "Selections updated"))
}

pub async fn deselect_tour(
    State(state): State<AppState>,
    Path((fan_id, selection_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, FlowError> {
    state.journey.deselect_tour(fan_id, selection_id).await?;
    Ok(empty_success("Selection removed"))
}
