//! Fetch through the host application's own relay endpoint.
//!
//! The endpoint is optional. When it is not configured, or answers with
//! anything other than markup, the strategy simply yields nothing.

use super::url_structural::parse_player_path;
use super::{remaining, FetchStrategy, FetchTarget};
use crate::error::{StrategyError, StrategyOutcome};
use crate::extract::HtmlExtractor;
use crate::http_client::HttpClient;
use crate::types::PlayerRecord;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Instant;

/// Request body sent to the first-party relay.
#[derive(Debug, Serialize)]
pub struct ProxyRequest<'a> {
    pub url: &'a str,
}

/// Response body from the first-party relay.
#[derive(Debug, Deserialize)]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(default)]
    pub html: Option<String>,
}

pub struct FirstPartyProxyStrategy {
    http: HttpClient,
    endpoint: Option<String>,
    extractor: Arc<HtmlExtractor>,
}

impl FirstPartyProxyStrategy {
    pub fn new(http: HttpClient, endpoint: Option<String>, extractor: Arc<HtmlExtractor>) -> Self {
        Self {
            http,
            endpoint,
            extractor,
        }
    }
}

#[async_trait]
impl FetchStrategy for FirstPartyProxyStrategy {
    fn name(&self) -> &'static str {
        "first_party_proxy"
    }

    async fn attempt(&self, target: &FetchTarget<'_>, deadline: Instant) -> StrategyOutcome {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(StrategyError::Unavailable(
                "no first-party proxy configured".to_string(),
            ));
        };

        let body = ProxyRequest {
            url: target.source_url,
        };
        let resp = self
            .http
            .post_json(endpoint, &body, remaining(deadline)?)
            .await?;
        if resp.status == 404 {
            return Err(StrategyError::Unavailable(format!(
                "first-party proxy not found at {endpoint}"
            )));
        }
        if !resp.is_success() {
            return Err(StrategyError::HttpStatus(resp.status));
        }

        let parsed: ProxyResponse = serde_json::from_str(&resp.body)
            .map_err(|e| StrategyError::EnvelopeParse(e.to_string()))?;
        let html = match parsed {
            ProxyResponse {
                success: true,
                html: Some(html),
            } if !html.trim().is_empty() => html,
            _ => {
                return Err(StrategyError::Unavailable(
                    "first-party proxy returned no markup".to_string(),
                ))
            }
        };

        let fields = self
            .extractor
            .extract(&html)
            .ok_or(StrategyError::WeakSignal)?;

        Ok(PlayerRecord::from_fields(
            target.external_id,
            fields,
            parse_player_path(target.source_url).map(|p| p.version_id),
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_response_html_optional() {
        let r: ProxyResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!r.success);
        assert!(r.html.is_none());

        let r: ProxyResponse =
            serde_json::from_str(r#"{"success":true,"html":"<h1>x</h1>"}"#).unwrap();
        assert_eq!(r.html.as_deref(), Some("<h1>x</h1>"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ProxyRequest {
            url: "https://site.example/player/1/a/2/",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "url": "https://site.example/player/1/a/2/" }));
    }

    #[tokio::test]
    async fn test_unconfigured_is_unavailable() {
        let strategy = FirstPartyProxyStrategy::new(
            HttpClient::new("test", std::time::Duration::from_secs(1)),
            None,
            Arc::new(HtmlExtractor::new()),
        );
        let target = FetchTarget {
            source_url: "https://site.example/player/1/a/2/",
            external_id: 1,
        };
        let deadline = Instant::now() + std::time::Duration::from_secs(1);
        let err = strategy.attempt(&target, deadline).await.unwrap_err();
        assert!(matches!(err, StrategyError::Unavailable(_)));
        assert!(err.is_expected());
    }
}
