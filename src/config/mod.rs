//! Process configuration, read once from the environment at startup.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::cors_layer;
pub use security::SecurityHeadersLayer;

use crate::domain::JourneySettings;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_TOURS: i32 = 5;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UPLOAD_DIR: &str = "uploads/photo_ids";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Absent in development: the server falls back to the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    /// Guards the administrative endpoints; when unset they are disabled.
    pub admin_api_key: Option<String>,
    pub max_tours_per_fan: i32,
    pub generation_timeout: Duration,
    pub upload_dir: String,
    pub cors_allowed_origins: Vec<String>,
    pub production: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let max_tours_per_fan = env::var("MAX_TOURS_PER_FAN")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_TOURS);
        let generation_timeout_secs = env::var("TICKET_GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS);
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_url: env::var("DATABASE_URL").ok(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            admin_api_key: env::var("ADMIN_API_KEY").ok().filter(|k| !k.is_empty()),
            max_tours_per_fan,
            generation_timeout: Duration::from_secs(generation_timeout_secs),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string()),
            cors_allowed_origins,
            production: env::var("RUST_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        }
    }

    pub fn journey_settings(&self) -> JourneySettings {
        JourneySettings {
            max_tours_per_fan: self.max_tours_per_fan,
            generation_timeout: self.generation_timeout,
        }
    }
}
