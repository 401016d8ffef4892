//! Fetch through public relay endpoints.
//!
//! Relays are untrusted and individually unreliable. Each is tried once, in
//! configured order; a bad status, an envelope that does not unwrap or markup
//! without a strong signal moves on to the next relay.

use super::url_structural::parse_player_path;
use super::{remaining, FetchStrategy, FetchTarget};
use crate::config::{Envelope, RelayConfig};
use crate::error::{StrategyError, StrategyOutcome};
use crate::extract::HtmlExtractor;
use crate::http_client::HttpClient;
use crate::types::PlayerRecord;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

pub struct RelayStrategy {
    http: HttpClient,
    relays: Vec<RelayConfig>,
    extractor: Arc<HtmlExtractor>,
}

impl RelayStrategy {
    pub fn new(http: HttpClient, relays: Vec<RelayConfig>, extractor: Arc<HtmlExtractor>) -> Self {
        Self {
            http,
            relays,
            extractor,
        }
    }

    async fn try_relay(
        &self,
        relay: &RelayConfig,
        target: &FetchTarget<'_>,
        deadline: Instant,
    ) -> StrategyOutcome {
        let request_url = relay.request_url(target.source_url);
        let resp = self
            .http
            .get(&request_url, &[], remaining(deadline)?)
            .await?;
        if !resp.is_success() {
            return Err(StrategyError::HttpStatus(resp.status));
        }

        let markup = unwrap_envelope(relay.envelope, &resp.body)?;
        let fields = self
            .extractor
            .extract(&markup)
            .ok_or(StrategyError::WeakSignal)?;

        Ok(PlayerRecord::from_fields(
            target.external_id,
            fields,
            parse_player_path(target.source_url).map(|p| p.version_id),
            Utc::now(),
        ))
    }
}

/// Get the page markup out of a relay response body.
pub fn unwrap_envelope(envelope: Envelope, body: &str) -> Result<String, StrategyError> {
    match envelope {
        Envelope::Raw => {
            if body.trim().is_empty() {
                Err(StrategyError::EnvelopeParse("empty body".to_string()))
            } else {
                Ok(body.to_string())
            }
        }
        Envelope::JsonContents => {
            let value: Value = serde_json::from_str(body)
                .map_err(|e| StrategyError::EnvelopeParse(e.to_string()))?;

            // Some wrappers report the upstream status alongside the payload
            if let Some(code) = value
                .get("status")
                .and_then(|s| s.get("http_code"))
                .and_then(|c| c.as_u64())
            {
                if !(200..300).contains(&code) {
                    return Err(StrategyError::HttpStatus(
                        u16::try_from(code).unwrap_or(u16::MAX),
                    ));
                }
            }

            match value.get("contents").and_then(|c| c.as_str()) {
                Some(contents) if !contents.trim().is_empty() => Ok(contents.to_string()),
                Some(_) => Err(StrategyError::EnvelopeParse("empty contents".to_string())),
                None => Err(StrategyError::EnvelopeParse(
                    "missing contents field".to_string(),
                )),
            }
        }
    }
}

#[async_trait]
impl FetchStrategy for RelayStrategy {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn attempt(&self, target: &FetchTarget<'_>, deadline: Instant) -> StrategyOutcome {
        if self.relays.is_empty() {
            return Err(StrategyError::Unavailable("no relays configured".to_string()));
        }

        for relay in &self.relays {
            match self.try_relay(relay, target, deadline).await {
                Ok(record) => return Ok(record),
                Err(StrategyError::Timeout) => return Err(StrategyError::Timeout),
                Err(e) => tracing::debug!("relay {} failed: {e}", relay.name),
            }
        }

        Err(StrategyError::RelaysExhausted(self.relays.len()))
    }
}
