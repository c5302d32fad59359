//! HTTP rendering of journey failures.
//!
//! Every `FlowError` maps to a status and a stable error code; validation
//! failures additionally carry their field map so the client can highlight
//! the offending inputs. Storage and invariant errors are logged in full
//! and surfaced to the client as an opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::domain::FlowError;
use crate::utils::response::error as error_response;

pub fn status_for(err: &FlowError) -> StatusCode {
    match err {
        FlowError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FlowError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
        FlowError::DuplicateSelection { .. }
        | FlowError::AlreadyComplete
        | FlowError::ImmutableAfterConsent => StatusCode::CONFLICT,
        FlowError::CapacityExceeded { .. }
        | FlowError::TourUnavailable { .. }
        | FlowError::ConsentRequired
        | FlowError::NoSelections => StatusCode::BAD_REQUEST,
        FlowError::NotFound(_) => StatusCode::NOT_FOUND,
        FlowError::GenerationFailed { .. }
        | FlowError::InvariantViolation(_)
        | FlowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let code = self.code();

        if status.is_server_error() {
            error!(error = ?self, code, "request failed");
        }

        // Internal details stay in the logs; the client sees the code and a
        // high-level message.
        let (message, details) = match &self {
            FlowError::ValidationFailed(errors) => (
                self.to_string(),
                serde_json::to_value(errors).ok(),
            ),
            FlowError::Storage(_) | FlowError::InvariantViolation(_) => {
                ("an internal error occurred".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        error_response(code, message, details, status)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::ValidationErrors;

    use super::*;

    #[test]
    fn gate_failures_map_to_client_statuses() {
        assert_eq!(
            status_for(&FlowError::PaymentRequired),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_for(&FlowError::DuplicateSelection {
                tour_id: Uuid::new_v4()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&FlowError::CapacityExceeded { current: 5, max: 5 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&FlowError::ValidationFailed(ValidationErrors::single(
                "email",
                "enter a valid email address",
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&FlowError::NotFound("fan")),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_failures_are_opaque_500s() {
        assert_eq!(
            status_for(&FlowError::InvariantViolation("count drifted".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let response = FlowError::InvariantViolation("count drifted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
