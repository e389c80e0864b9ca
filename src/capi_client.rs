use crate::capi_models::ConversionEvent;
use crate::errors::AppError;
use serde_json::json;
use std::time::Duration;

const GRAPH_API_VERSION: &str = "v18.0";

/// Client for the Meta Conversions API ingestion endpoint.
#[derive(Clone)]
pub struct CapiClient {
    client: reqwest::Client,
    base_url: String,
    pixel_id: String,
    access_token: String,
}

impl CapiClient {
    /// Creates a new `CapiClient`.
    ///
    /// # Arguments
    ///
    /// * `graph_domain` - Graph API domain (e.g. `facebook.com`).
    /// * `pixel_id` - Dataset/pixel receiving the events.
    /// * `access_token` - Conversions API access token.
    /// * `timeout` - Bound on the dispatch request.
    pub fn new(
        graph_domain: &str,
        pixel_id: String,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create graph client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!("https://graph.{}", graph_domain),
            pixel_id,
            access_token,
        })
    }

    /// Pins the client to a fixed base URL (mocked tests).
    #[allow(dead_code)]
    pub fn with_base_url(
        base_url: String,
        pixel_id: String,
        access_token: String,
    ) -> Result<Self, AppError> {
        let mut client = Self::new("facebook.com", pixel_id, access_token, Duration::from_secs(10))?;
        client.base_url = base_url.trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Posts a single conversion event.
    ///
    /// Repeat deliveries for the same lead carry the same `event_id`, so
    /// deduplication happens on the platform side, not here.
    pub async fn send_event(&self, event: &ConversionEvent) -> Result<(), AppError> {
        let url = format!(
            "{}/{}/{}/events",
            self.base_url, GRAPH_API_VERSION, self.pixel_id
        );
        tracing::info!("Dispatching conversion event {} to graph API", event.event_id);
        // Redact token from logs to prevent credential exposure
        tracing::debug!("Graph API URL: {}?access_token=[REDACTED]", url);

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .json(&json!({ "data": [event] }))
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Graph API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream { status, body });
        }

        // Body is { "events_received": N, "fbtrace_id": "..." }
        if let Ok(body) = response.text().await {
            tracing::debug!("Graph API accepted event {}: {}", event.event_id, body);
        }

        Ok(())
    }
}
