//! Error types.
//!
//! None of these escape [`crate::PlayerScout::fetch_player_data`]; they exist
//! so strategies can report why they yielded nothing, and so the chain can
//! log it.

use crate::types::PlayerRecord;

/// Why a single strategy attempt produced no record.
#[derive(thiserror::Error, Debug)]
pub enum StrategyError {
    #[error("Rate limit exceeded: {max} requests per window")]
    RateLimitExceeded { max: u32 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Attempt timed out")]
    Timeout,

    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("Envelope parse error: {0}")]
    EnvelopeParse(String),

    #[error("Markup had no rating or name")]
    WeakSignal,

    #[error("Source URL does not match the player path pattern: {0}")]
    MalformedSourceUrl(String),

    #[error("Strategy unavailable: {0}")]
    Unavailable(String),

    #[error("All {0} relays failed")]
    RelaysExhausted(usize),
}

impl StrategyError {
    /// Expected skips are logged quietly; the rest are worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            StrategyError::Unavailable(_)
                | StrategyError::MalformedSourceUrl(_)
                | StrategyError::WeakSignal
        )
    }
}

impl From<reqwest::Error> for StrategyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StrategyError::Timeout
        } else {
            StrategyError::Network(e.to_string())
        }
    }
}

/// Result of one strategy attempt.
pub type StrategyOutcome = Result<PlayerRecord, StrategyError>;

/// Errors loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}
