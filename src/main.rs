mod amo_client;
mod capi_client;
mod capi_models;
mod config;
mod errors;
mod handlers;
mod hashing;
mod models;
mod pipeline;
mod webhook_models;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::amo_client::AmoClient;
use crate::capi_client::CapiClient;
use crate::config::Config;
use crate::pipeline::Pipeline;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The amoCRM and Conversions API clients.
/// - HTTP routes and middleware (request size limit, rate limiting).
///
/// It then starts the Axum server.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amo_capi_bridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let timeout = Duration::from_secs(config.http_timeout_secs);

    let amo = AmoClient::new(
        config.amo_base_domain.clone(),
        config.amo_access_token.clone(),
        timeout,
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!("✓ amoCRM client initialized: *.{}", config.amo_base_domain);

    let capi = CapiClient::new(
        &config.fb_graph_domain,
        config.fb_pixel_id.clone(),
        config.fb_access_token.clone(),
        timeout,
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!(
        "✓ Conversions API client initialized: graph.{}",
        config.fb_graph_domain
    );

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        pipeline: Pipeline::new(amo, capi, config.target_status_id, config.currency.clone()),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // amoCRM status-change webhook endpoint
        .route("/api/v1/webhooks/amo", post(handlers::amo_webhook))
        .layer(
            ServiceBuilder::new()
                // Request size limit: webhook bodies are small; 1MB is generous
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
