use axum::{
    routing::{get, post},
    Router,
    Json,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod models;
mod projections;
mod stage;
mod timestamp;


use config::{Cli, ServerConfig};
use error::ApiError;
use models::{InsightsRequest, InsightsResponse};
use projections::build_journey_insights;

/// Stateless HTTP API
/// Every journey is derived fresh from the request body
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(Cli::parse());
    init_tracing(config.log_json);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Journey Insights API listening");

    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "journey_insights_api=info,tower_http=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Build the router with every route registered explicitly
fn app() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/journey-insights", post(journey_insights))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Accepts a list of events, returns base analytics
async fn journey_insights(
    Json(request): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>, ApiError> {
    debug!(events = request.events.len(), "Building journey insights");

    let base = build_journey_insights(&request.events)?.ok_or(ApiError::NoEvents)?;

    info!(
        steps = base.steps.len(),
        edges = base.graph.edges.len(),
        "Journey insights built"
    );

    Ok(Json(InsightsResponse { base }))
}
