use std::net::SocketAddr;
use std::sync::Arc;

use els_core::{AnnotationEngine, MemoryStore, ProgressStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use els_api::config::ServerConfig;
use els_api::router::build_app_router;
use els_api::state::AppState;
use els_api::inventory;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "els_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Session-immutable inputs ---
    let schema = inventory::load_schema(&config).expect("Failed to load question schema");
    tracing::info!(questions = schema.len(), "Question schema loaded");

    let images = inventory::load_image_set(&config).expect("Failed to load image inventory");
    tracing::info!(images = images.len(), "Image inventory loaded");

    // --- Progress store ---
    let store: Arc<dyn ProgressStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = els_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            els_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            els_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Using PostgreSQL progress store");
            Arc::new(els_db::PgProgressStore::new(pool))
        }
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set; using the in-memory store (progress is lost on restart)"
            );
            Arc::new(MemoryStore::new())
        }
    };

    // --- Engine and app state ---
    let engine = AnnotationEngine::new(schema, images, store);
    let state = AppState {
        engine: Arc::new(engine),
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
