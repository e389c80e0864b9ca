use crate::errors::AppError;
use crate::models::{Contact, Lead};
use std::time::Duration;

/// Read-only client for the amoCRM v4 API.
///
/// Every call is scoped to the subdomain that produced the webhook, so a
/// lookup can never cross into another account. A failed call is not
/// retried; it aborts the pipeline run for that webhook.
#[derive(Clone)]
pub struct AmoClient {
    client: reqwest::Client,
    base_domain: String,
    base_override: Option<String>,
    token: String,
}

impl AmoClient {
    /// Creates a new `AmoClient`.
    ///
    /// # Arguments
    ///
    /// * `base_domain` - The amoCRM top-level domain (e.g. `amocrm.ru`).
    /// * `token` - Static bearer credential for the account.
    /// * `timeout` - Bound on every request so a stalled upstream cannot
    ///   hang the handler.
    pub fn new(base_domain: String, token: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create amoCRM client: {}", e)))?;

        Ok(Self {
            client,
            base_domain,
            base_override: None,
            token,
        })
    }

    /// Pins every call to a fixed base URL regardless of the webhook's
    /// subdomain. Used for self-hosted gateways and mocked tests.
    #[allow(dead_code)]
    pub fn with_base_url(base_url: String, token: String) -> Result<Self, AppError> {
        let mut client = Self::new(String::new(), token, Duration::from_secs(10))?;
        client.base_override = Some(base_url.trim_end_matches('/').to_string());
        Ok(client)
    }

    fn base_url(&self, subdomain: &str) -> String {
        match &self.base_override {
            Some(base) => base.clone(),
            None => format!("https://{}.{}", subdomain, self.base_domain),
        }
    }

    /// Gets a lead, optionally with its embedded contact references.
    pub async fn fetch_lead(
        &self,
        subdomain: &str,
        lead_id: u64,
        with_contacts: bool,
    ) -> Result<Lead, AppError> {
        let mut url = format!("{}/api/v4/leads/{}", self.base_url(subdomain), lead_id);
        if with_contacts {
            url.push_str("?with=contacts");
        }
        tracing::info!("Fetching lead {} from amoCRM: {}", lead_id, url);
        self.get_json(&url).await
    }

    /// Gets a contact by id.
    pub async fn fetch_contact(&self, subdomain: &str, contact_id: u64) -> Result<Contact, AppError> {
        let url = format!("{}/api/v4/contacts/{}", self.base_url(subdomain), contact_id);
        tracing::info!("Fetching contact {} from amoCRM: {}", contact_id, url);
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("amoCRM request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(format!("Failed to parse amoCRM response: {}", e)))
    }
}
