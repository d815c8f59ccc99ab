use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("no element matches `{selector}`")]
    ElementNotFound { selector: String },

    #[error("challenge page presented at {url}")]
    ChallengePresented { url: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("browser: {0}")]
    Browser(String),

    #[error("malformed selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("html normalization failed: {0}")]
    Normalize(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Persistence(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    pub fn browser(err: impl std::fmt::Display) -> Self {
        Self::Browser(err.to_string())
    }

    /// Failures a retry ladder may absorb. Everything else propagates.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::ChallengePresented { .. }
        )
    }
}
