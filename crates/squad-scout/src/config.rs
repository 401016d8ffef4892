//! Configuration loading and resolution.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "SQUAD_SCOUT_CONFIG";
/// Env var overriding the first-party relay endpoint.
pub const PROXY_URL_ENV: &str = "SQUAD_SCOUT_PROXY_URL";
/// Placeholder a relay template must contain.
pub const URL_PLACEHOLDER: &str = "{url}";
/// Upper bound for every duration setting: one year.
pub const MAX_DURATION_MS: u64 = 365 * 24 * 60 * 60 * 1000;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                  AppleWebKit/537.36 (KHTML, like Gecko) \
                                  Chrome/131.0.0.0 Safari/537.36";

/// How a relay wraps the markup it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    /// Body is the page markup as-is.
    Raw,
    /// Body is JSON with the markup in a `contents` string field.
    JsonContents,
}

/// A third-party relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub name: String,
    /// Request URL with a `{url}` placeholder for the encoded source URL.
    pub url_template: String,
    pub envelope: Envelope,
}

impl RelayConfig {
    pub fn new(name: &str, url_template: &str, envelope: Envelope) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
            envelope,
        }
    }

    /// Expand the template for a source URL.
    pub fn request_url(&self, source_url: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(source_url.as_bytes()).collect();
        self.url_template.replace(URL_PLACEHOLDER, &encoded)
    }
}

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_ms: 60_000,
        }
    }
}

/// Top-level configuration for a [`crate::PlayerScout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub cache_ttl_ms: u64,
    pub rate_limit: RateLimitConfig,
    /// Upper bound on each strategy attempt.
    pub attempt_timeout_ms: u64,
    pub user_agent: String,
    /// Relays tried in order by the relay strategy.
    pub relays: Vec<RelayConfig>,
    /// Local endpoint accepting `POST {"url": ...}` and answering
    /// `{"success": bool, "html": string?}`.
    pub first_party_proxy: Option<String>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 3_600_000,
            rate_limit: RateLimitConfig::default(),
            attempt_timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            relays: default_relays(),
            first_party_proxy: None,
        }
    }
}

/// Public relays used when no config overrides them.
pub fn default_relays() -> Vec<RelayConfig> {
    vec![
        RelayConfig::new(
            "allorigins",
            "https://api.allorigins.win/get?url={url}",
            Envelope::JsonContents,
        ),
        RelayConfig::new("corsproxy", "https://corsproxy.io/?{url}", Envelope::Raw),
        RelayConfig::new(
            "codetabs",
            "https://api.codetabs.com/v1/proxy?quest={url}",
            Envelope::Raw,
        ),
    ]
}

impl ScoutConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit.window_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Read and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: ScoutConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve, load and validate the configuration.
    ///
    /// Uses the first of: `explicit`, `$SQUAD_SCOUT_CONFIG`,
    /// `./.squad-scout/config.json`; falls back to defaults when none exists.
    /// `$SQUAD_SCOUT_PROXY_URL` is applied on top.
    pub fn load(explicit: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match resolve_config_path(explicit) {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        if let Ok(proxy) = std::env::var(PROXY_URL_ENV) {
            if !proxy.trim().is_empty() {
                config.first_party_proxy = Some(proxy.trim().to_string());
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_requests must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_ms must be greater than 0".to_string(),
            ));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "attempt_timeout_ms must be greater than 0".to_string(),
            ));
        }
        for (key, value) in [
            ("cache_ttl_ms", self.cache_ttl_ms),
            ("rate_limit.window_ms", self.rate_limit.window_ms),
            ("attempt_timeout_ms", self.attempt_timeout_ms),
        ] {
            if value > MAX_DURATION_MS {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be at most {MAX_DURATION_MS} (one year)"
                )));
            }
        }
        if let Some(relay) = self
            .relays
            .iter()
            .find(|r| !r.url_template.contains(URL_PLACEHOLDER))
        {
            return Err(ConfigError::Invalid(format!(
                "relay '{}' url_template is missing {URL_PLACEHOLDER}",
                relay.name
            )));
        }
        Ok(())
    }
}

/// Find the config file to load, if any.
///
/// An explicit path is returned even if it does not exist, so that loading
/// it reports the problem instead of silently using defaults.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let cwd_config = PathBuf::from(".squad-scout/config.json");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}
