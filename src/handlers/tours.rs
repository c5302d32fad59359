//! Public tour catalog endpoints.

use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use crate::domain::FlowError;
use crate::utils::response::success;

use super::AppState;

/// Tours a fan can still pick: active and with tickets remaining.
pub async fn available_tours(State(state): State<AppState>) -> Result<Response, FlowError> {
    let tours = state.journey.available_tours().await?;
    Ok(success(tours, "Available tours retrieved"))
}

pub async fn all_tours(State(state): State<AppState>) -> Result<Response, FlowError> {
    let tours = state.journey.list_tours().await?;
    Ok(success(tours, "Tours retrieved"))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
) -> Result<Response, FlowError> {
    let tour = state.journey.tour(tour_id).await?;
    Ok(success(tour, "Tour found"))
}
