use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use config::Config;
use db::DocumentStore;
use error::ApiError;

/// Shared handler state. The store is absent when the service runs without
/// a configured or reachable database.
#[derive(Clone)]
pub struct AppState {
    pub store: Option<DocumentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Option<DocumentStore>, config: Config) -> Self {
        Self { store, config: Arc::new(config) }
    }

    pub fn store(&self) -> Result<&DocumentStore, ApiError> {
        self.store.as_ref().ok_or(ApiError::DatabaseNotConfigured)
    }
}

pub fn app(state: AppState) -> Router {
    // Any origin may call the API; restrict at the proxy if needed.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Root and diagnostics
        .route("/", get(routes::root::root))
        .route("/test", get(routes::diagnostics::test_database))

        // Player endpoints
        .route(
            "/api/players",
            get(routes::players::list_players).post(routes::players::create_player),
        )

        // Match endpoints
        .route(
            "/api/matches",
            get(routes::matches::list_matches).post(routes::matches::create_match),
        )

        // Stat endpoints
        .route("/api/stats", post(routes::stats::create_statline))
        .route("/api/stats/by-match/{match_id}", get(routes::stats::list_stats_by_match))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
