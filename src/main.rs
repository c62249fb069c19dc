mod api_client;
mod config;
mod diagnostics;
mod errors;
mod handlers;
mod models;
mod stats;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api_client::LoanApiClient;
use crate::config::Config;
use crate::handlers::AppState;

/// Main entry point for the application.
///
/// Initializes logging and configuration, builds the API client, performs
/// the initial portfolio fetch, and starts the Axum server. A failed
/// initial fetch is recorded in the view and surfaced on the dashboard;
/// it never prevents startup.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loan_portfolio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the document API client
    let client = LoanApiClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize API client: {}", e))?;
    tracing::info!("Document API client initialized: {}", config.api_root());

    let state = Arc::new(AppState::new(config.clone(), client));

    // Initial fetch, mirroring a first render: the dashboard comes up with
    // data when the backend is reachable and with an inline error when not.
    let view = handlers::refresh(&state).await;
    match &view.last_error {
        None => tracing::info!("Initial fetch loaded {} loan records", view.stats.total),
        Some(e) => tracing::warn!("Initial fetch failed: {}", e),
    }

    let app = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/health", get(handlers::health))
        .route("/api/v1/portfolio", get(handlers::get_portfolio))
        .route(
            "/api/v1/portfolio/refresh",
            post(handlers::refresh_portfolio),
        )
        .route("/api/v1/loans", get(handlers::list_loans))
        .route("/api/v1/loans/raw", get(handlers::get_raw_records))
        // Diagnostic entry point; not part of the record-viewing flow
        .route("/api/v1/diagnostics", get(handlers::run_diagnostics))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
