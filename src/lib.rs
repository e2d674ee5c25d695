use std::sync::Arc;

use axum::{extract::Extension, Router};
use sqlx::SqlitePool;
use tower_http::services::ServeDir;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::info;

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod ocr;
pub mod routes;
pub mod session;
pub mod templates;
pub mod verify;

use config::Config;
use ocr::GeminiClient;
use routes::auth::auth_router;
use routes::pages::pages_router;
use verify::Verifier;

/// Assemble the full application router. Split out so tests can drive
/// it with an in-memory pool and stub verification strategies.
pub fn router(pool: SqlitePool, verifier: Arc<Verifier>, static_dir: &str) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    Router::new()
        // Merge auth routes (signup, login, logout)
        .merge(auth_router())
        // Merge page routes (landing + session-gated views)
        .merge(pages_router())
        // Stylesheet and friends
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        // Add database pool
        .layer(Extension(pool))
        // Add verification chain
        .layer(Extension(verifier))
}

pub async fn start_server(config: Config) {
    templates::init(&config.template_dir).expect("Failed to register templates");

    let pool = db::init(&config.database_url)
        .await
        .expect("Failed to connect to SQLite");

    let vision = GeminiClient::new(
        &config.gemini_base_url,
        &config.gemini_api_key,
        &config.gemini_model,
    );
    let verifier = Arc::new(Verifier::new(Box::new(vision)));

    let app = router(pool, verifier, &config.static_dir);

    info!("🚀 Listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server error");
}
