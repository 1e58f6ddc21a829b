use basketball_team_api::{app, config::Config, db::DocumentStore, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting basketball team api...");

    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // The API still serves without a database; data endpoints answer 500.
    let store = match config.database() {
        Some((url, name)) => match DocumentStore::connect(url, name).await {
            Ok(store) => {
                tracing::info!("Database connection established ({}).", name);
                Some(store)
            }
            Err(e) => {
                tracing::error!("Failed to connect to database: {}", e);
                None
            }
        },
        None => {
            tracing::warn!("DATABASE_URL and DATABASE_NAME must both be set; running without a database.");
            None
        }
    };

    let addr = config.listen_addr();
    let app = app(AppState::new(store, config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
