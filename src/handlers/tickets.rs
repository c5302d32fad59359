//! Ticket generation, downloads and verification.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::domain::FlowError;
use crate::utils::response::success;

use super::AppState;

/// Idempotent: selections that already hold a ticket are reported, not
/// reissued.
pub async fn generate_tickets(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
) -> Result<Response, FlowError> {
    let outcomes = state.journey.ensure_tickets(fan_id).await?;
    Ok(success(outcomes, "Ticket generation complete"))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Path(fan_id): Path<Uuid>,
) -> Result<Response, FlowError> {
    let tickets = state.journey.downloads(fan_id).await?;
    Ok(success(tickets, "Tickets retrieved"))
}

/// Reissues one selection's ticket; the previous ticket id stops resolving.
pub async fn regenerate_ticket(
    State(state): State<AppState>,
    Path(selection_id): Path<Uuid>,
) -> Result<Response, FlowError> {
    let ticket = state.journey.regenerate_ticket(selection_id).await?;
    Ok(success(ticket, "Ticket regenerated"))
}

pub async fn verify_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Response, FlowError> {
    let verified = state.journey.verify_ticket(&ticket_id).await?;
    Ok(success(verified, "Ticket is valid"))
}

/// Serves the artifact behind a ticket's `download_ref`. Rendering is a
/// plain-text pass; a superseded ticket id downloads nothing (404).
pub async fn download_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Response, FlowError> {
    let ticket = state.journey.verify_ticket(&ticket_id).await?;
    let pass = format!(
        "VIP TICKET {id}\n\
         {title}\n\
         {venue}, {city}\n\
         Admit: {name}\n\
         Issued: {issued}\n",
        id = ticket.ticket_id,
        title = ticket.tour_title,
        venue = ticket.tour_venue,
        city = ticket.tour_city,
        name = ticket.fan_name,
        issued = ticket.generated_at.to_rfc3339(),
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.txt\"", ticket.ticket_id),
            ),
        ],
        pass,
    )
        .into_response())
}
