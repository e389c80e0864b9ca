#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub amo_access_token: String,
    pub amo_base_domain: String,
    pub fb_pixel_id: String,
    pub fb_access_token: String,
    pub fb_graph_domain: String,
    /// Only status changes into this id are forwarded; unset forwards all.
    pub target_status_id: Option<u64>,
    pub currency: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            amo_access_token: std::env::var("AMO_ACCESS_TOKEN")
                .map_err(|_| anyhow::anyhow!("AMO_ACCESS_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("AMO_ACCESS_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            amo_base_domain: std::env::var("AMO_BASE_DOMAIN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "amocrm.ru".to_string()),
            fb_pixel_id: std::env::var("FB_PIXEL_ID")
                .map_err(|_| anyhow::anyhow!("FB_PIXEL_ID environment variable required"))
                .and_then(|id| {
                    if id.trim().is_empty() {
                        anyhow::bail!("FB_PIXEL_ID cannot be empty");
                    }
                    Ok(id)
                })?,
            fb_access_token: std::env::var("FB_ACCESS_TOKEN")
                .map_err(|_| anyhow::anyhow!("FB_ACCESS_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("FB_ACCESS_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            fb_graph_domain: std::env::var("FB_GRAPH_DOMAIN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "facebook.com".to_string()),
            target_status_id: match std::env::var("TARGET_STATUS_ID") {
                Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("TARGET_STATUS_ID must be a numeric amoCRM status id")
                })?),
                _ => None,
            },
            currency: std::env::var("CURRENCY")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "USD".to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a number of seconds"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("amoCRM base domain: {}", config.amo_base_domain);
        tracing::debug!("Graph API domain: {}", config.fb_graph_domain);
        tracing::debug!("Pixel ID: {}", config.fb_pixel_id);
        match config.target_status_id {
            Some(id) => tracing::info!("Forwarding only transitions into status {}", id),
            None => {
                tracing::warn!("TARGET_STATUS_ID not set; every status change will be forwarded")
            }
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
