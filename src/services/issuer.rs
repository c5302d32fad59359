//! Ticket generation service boundary.
//!
//! Treated as at-least-once-retryable: calls may fail or time out, and the
//! orchestrator reports those per selection instead of aborting the batch.

use async_trait::async_trait;
use uuid::Uuid;

use crate::utils::validators::generate_ticket_id;

#[derive(Debug, Clone)]
pub struct IssuedTicket {
    pub ticket_id: String,
    pub download_ref: String,
}

#[async_trait]
pub trait TicketIssuer: Send + Sync {
    async fn generate(&self, selection_id: Uuid) -> Result<IssuedTicket, String>;
}

/// In-process issuer: mints an opaque ticket id and a download reference
/// served by this application. Rendering of the PDF/QR artifact behind the
/// reference is outside this service.
#[derive(Default)]
pub struct LocalIssuer;

#[async_trait]
impl TicketIssuer for LocalIssuer {
    async fn generate(&self, _selection_id: Uuid) -> Result<IssuedTicket, String> {
        let ticket_id = generate_ticket_id();
        let download_ref = format!("/api/tickets/download/{ticket_id}");
        Ok(IssuedTicket {
            ticket_id,
            download_ref,
        })
    }
}
