use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate limited")]
    RateLimited,

    #[error("provider unavailable")]
    Unavailable,

    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("{provider} request failed: {message}")]
    Service { provider: String, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Credentials or model names the service refused; fixing the configuration
    /// is the only remedy.
    #[error("{provider} rejected the configuration: {message}")]
    Misconfigured { provider: String, message: String },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: String },

    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("operation cancelled")]
    Cancelled,
}

impl LlmError {
    /// Whether a caller may retry the same request after a backoff.
    ///
    /// Timeouts and cancellation are deliberately excluded: both are caller
    /// decisions and are propagated verbatim.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::RateLimited
                | Self::Unavailable
                | Self::EmptyResponse { .. }
                | Self::Service { .. }
        )
    }

    #[must_use]
    pub fn is_timeout_or_cancelled(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled)
    }
}
