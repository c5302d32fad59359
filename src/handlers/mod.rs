//! HTTP handlers. Each one is a thin shim: extract, call the journey
//! service, wrap the result in the JSON envelope. All gating decisions
//! live in the domain layer.

pub mod admin;
pub mod consent;
pub mod fans;
pub mod tickets;
pub mod tours;

use std::sync::Arc;

use axum::response::Response;
use serde::Serialize;

use crate::config::Settings;
use crate::domain::Journey;
use crate::utils::response::success;

#[derive(Clone)]
pub struct AppState {
    pub journey: Arc<Journey>,
    pub settings: Arc<Settings>,
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    success(
        HealthPayload {
            status: "ok",
            service: "vipfan-api",
        },
        "Health check successful",
    )
}
