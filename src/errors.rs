use std::fmt;

/// Failures that can abort a single pipeline run.
///
/// None of these ever reach the webhook sender: the orchestrator converts
/// every variant into a terminal outcome code behind an HTTP 200, so the
/// CRM never retries a delivery and never learns upstream details.
#[derive(Debug)]
pub enum AppError {
    /// Non-success HTTP status from the CRM or the ad platform.
    /// The raw upstream body is retained for diagnostic logging only.
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },
    /// The request could not complete (connect failure, timeout).
    Transport(String),
    /// The upstream answered 2xx with a body we could not decode.
    InvalidResponse(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Upstream { status, body } => {
                write!(f, "Upstream returned {}: {}", status, body)
            }
            AppError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AppError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_keeps_status_and_body() {
        let err = AppError::Upstream {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "backend down".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("502"));
        assert!(rendered.contains("backend down"));
    }
}
