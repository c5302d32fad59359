use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use vipfan_server::config::Settings;
use vipfan_server::domain::Journey;
use vipfan_server::handlers::AppState;
use vipfan_server::routes::create_routes;
use vipfan_server::services::{LocalIssuer, LocalPhotoVault, StoreCatalog};
use vipfan_server::store::memory::MemoryStore;
use vipfan_server::store::postgres::PgStore;
use vipfan_server::store::FanStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Arc::new(Settings::from_env());

    let store: Arc<dyn FanStore> = match &settings.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");
            sqlx::migrate!()
                .run(&pool)
                .await
                .expect("Failed to run migrations");
            tracing::info!("connected to Postgres, migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let journey = Journey::new(
        store.clone(),
        Arc::new(StoreCatalog::new(store)),
        Arc::new(LocalIssuer),
        Arc::new(LocalPhotoVault::new(settings.upload_dir.clone())),
        settings.journey_settings(),
    );

    let state = AppState {
        journey: Arc::new(journey),
        settings: settings.clone(),
    };
    let app = create_routes(state);

    tracing::info!("server listening at http://{}", settings.bind_addr);
    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server failed");
}
