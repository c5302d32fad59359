//! Administrative endpoints, guarded by the `x-admin-key` header. With no
//! key configured the whole surface is disabled.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::domain::tours::{NewTour, TourUpdate};
use crate::utils::response::{created, error, success};

use super::AppState;

const ADMIN_KEY_HEADER: &str = "x-admin-key";

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = state.settings.admin_api_key.as_deref() else {
        return Err(error(
            "ADMIN_DISABLED",
            "administrative endpoints are not configured",
            None,
            StatusCode::SERVICE_UNAVAILABLE,
        ));
    };
    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if provided != expected {
        tracing::warn!("rejected admin request with missing or wrong key");
        return Err(error(
            "UNAUTHORIZED",
            "a valid admin key is required",
            None,
            StatusCode::UNAUTHORIZED,
        ));
    }
    Ok(())
}

pub async fn create_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new_tour): Json<NewTour>,
) -> Result<Response, Response> {
    require_admin(&state, &headers)?;
    let tour = state
        .journey
        .create_tour(new_tour)
        .await
        .map_err(axum::response::IntoResponse::into_response)?;
    Ok(created(tour, "Tour created"))
}

pub async fn update_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tour_id): Path<Uuid>,
    Json(update): Json<TourUpdate>,
) -> Result<Response, Response> {
    require_admin(&state, &headers)?;
    let tour = state
        .journey
        .update_tour(tour_id, update)
        .await
        .map_err(axum::response::IntoResponse::into_response)?;
    Ok(success(tour, "Tour updated"))
}

pub async fn toggle_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tour_id): Path<Uuid>,
) -> Result<Response, Response> {
    require_admin(&state, &headers)?;
    let tour = state
        .journey
        .toggle_tour_active(tour_id)
        .await
        .map_err(axum::response::IntoResponse::into_response)?;
    Ok(success(tour, "Tour toggled"))
}

/// Out-of-band payment confirmation: unlocks the consent step for the fan.
pub async fn verify_fan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(fan_id): Path<Uuid>,
) -> Result<Response, Response> {
    require_admin(&state, &headers)?;
    let fan = state
        .journey
        .mark_fan_verified(fan_id)
        .await
        .map_err(axum::response::IntoResponse::into_response)?;
    Ok(success(fan, "Fan payment verified"))
}

pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, Response> {
    require_admin(&state, &headers)?;
    let counts = state
        .journey
        .stats()
        .await
        .map_err(axum::response::IntoResponse::into_response)?;
    Ok(success(counts, "Stats retrieved"))
}
