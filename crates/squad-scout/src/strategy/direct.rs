//! Fetch the source page directly.
//!
//! Usually refused by the source, but cheap enough to try before falling
//! back further.

use super::url_structural::parse_player_path;
use super::{remaining, FetchStrategy, FetchTarget};
use crate::error::{StrategyError, StrategyOutcome};
use crate::extract::HtmlExtractor;
use crate::http_client::HttpClient;
use crate::types::PlayerRecord;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;

/// Browser-like headers sent with direct requests.
const DIRECT_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Cache-Control", "no-cache"),
];

pub struct DirectStrategy {
    http: HttpClient,
    extractor: Arc<HtmlExtractor>,
}

impl DirectStrategy {
    pub fn new(http: HttpClient, extractor: Arc<HtmlExtractor>) -> Self {
        Self { http, extractor }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn attempt(&self, target: &FetchTarget<'_>, deadline: Instant) -> StrategyOutcome {
        let resp = self
            .http
            .get(target.source_url, DIRECT_HEADERS, remaining(deadline)?)
            .await?;
        if !resp.is_success() {
            return Err(StrategyError::HttpStatus(resp.status));
        }

        let fields = self
            .extractor
            .extract(&resp.body)
            .ok_or(StrategyError::WeakSignal)?;

        Ok(PlayerRecord::from_fields(
            target.external_id,
            fields,
            parse_player_path(target.source_url).map(|p| p.version_id),
            Utc::now(),
        ))
    }
}
