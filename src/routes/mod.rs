//! Route table and middleware stack.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{cors_layer, SecurityHeadersLayer};
use crate::handlers::{admin, consent, fans, health_check, tickets, tours, AppState};

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        // Registration and fan lookup
        .route("/fans/register", post(fans::register))
        .route("/fans/:fan_id", get(fans::get_fan))
        .route("/fans/code/:code", get(fans::get_fan_by_code))
        .route("/fans/email/:email", get(fans::get_fan_by_email))
        // Tour selection
        .route(
            "/fans/:fan_id/selections",
            get(fans::list_selections)
                .post(fans::select_tour)
                .put(fans::replace_selections),
        )
        .route(
            "/fans/:fan_id/selections/:selection_id",
            delete(fans::deselect_tour),
        )
        // Consent
        .route("/fans/:fan_id/consent", post(consent::submit_consent))
        .route("/fans/:fan_id/consent/status", get(consent::consent_status))
        .route(
            "/fans/:fan_id/consent/photo-id",
            post(consent::upload_photo_id),
        )
        // Tickets
        .route("/fans/:fan_id/tickets", get(tickets::list_tickets))
        .route(
            "/fans/:fan_id/tickets/generate",
            post(tickets::generate_tickets),
        )
        .route(
            "/tickets/regenerate/:selection_id",
            post(tickets::regenerate_ticket),
        )
        .route("/tickets/verify/:ticket_id", get(tickets::verify_ticket))
        .route(
            "/tickets/download/:ticket_id",
            get(tickets::download_ticket),
        )
        // Tour catalog
        .route("/tours", get(tours::available_tours))
        .route("/tours/all", get(tours::all_tours))
        .route("/tours/:tour_id", get(tours::get_tour))
        // Administration
        .route("/admin/tours", post(admin::create_tour))
        .route("/admin/tours/:tour_id", put(admin::update_tour))
        .route("/admin/tours/:tour_id/toggle", post(admin::toggle_tour))
        .route("/admin/fans/:fan_id/verify", post(admin::verify_fan))
        .route("/admin/stats", get(admin::stats));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(SecurityHeadersLayer::new(state.settings.production))
        .layer(cors_layer(&state.settings.cors_allowed_origins))
        .with_state(state)
}
