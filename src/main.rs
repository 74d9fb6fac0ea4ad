use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impostor::{api, config::ServerConfig, janitor, state::AppState, state::SecretCatalog};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impostor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting impostor server...");

    let config = ServerConfig::from_env();
    let catalog = SecretCatalog::load_or_builtin(config.secret_catalog_path.as_deref());
    let state = Arc::new(AppState::with_catalog(catalog, config.room.clone()));

    // Evict rooms nobody has touched in a while
    janitor::spawn_room_janitor(state.clone(), config.sweep_interval, config.room_idle_ttl);

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
