use crate::pipeline::Pipeline;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Holds no mutable state: concurrent webhook deliveries are independent
/// runs and need no coordination.
#[derive(Clone)]
pub struct AppState {
    /// The event-enrichment-and-forwarding pipeline.
    pub pipeline: Pipeline,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "amo-capi-bridge",
            "version": "0.1.0"
        })),
    )
}

/// amoCRM status-change webhook endpoint.
///
/// Consumes the raw text body (JSON or form-encoded; the decoder sorts it
/// out) and always answers 200 with one of the fixed outcome codes. A
/// non-200 here would trigger CRM redelivery and risk duplicate
/// conversions, so business-logic rejections are plain-text codes instead.
pub async fn amo_webhook(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (StatusCode, &'static str) {
    tracing::info!("Received amoCRM webhook ({} bytes)", body.len());

    let outcome = state.pipeline.handle(&body).await;

    tracing::info!("Webhook processing complete: {}", outcome.as_str());
    (StatusCode::OK, outcome.as_str())
}
