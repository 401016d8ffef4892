//! Ordered fallback chain of fetch strategies.
//!
//! Strategies run strictly one after another. The first one to produce a
//! record wins; every failure, including a timeout or a panic inside a
//! strategy, is logged and treated as "nothing from this strategy".

pub mod direct;
pub mod first_party;
pub mod relay;
pub mod url_structural;

pub use direct::DirectStrategy;
pub use first_party::FirstPartyProxyStrategy;
pub use relay::RelayStrategy;
pub use url_structural::UrlStructuralStrategy;

use crate::config::ScoutConfig;
use crate::error::{StrategyError, StrategyOutcome};
use crate::extract::HtmlExtractor;
use crate::http_client::HttpClient;
use crate::types::PlayerRecord;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// What the chain is trying to acquire.
#[derive(Debug, Clone, Copy)]
pub struct FetchTarget<'a> {
    pub source_url: &'a str,
    pub external_id: u64,
}

/// One way of turning a target into a record.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Try to acquire the target before `deadline`.
    ///
    /// The chain also cancels the attempt at the deadline, so implementations
    /// only need the deadline to size their own request timeouts.
    async fn attempt(&self, target: &FetchTarget<'_>, deadline: Instant) -> StrategyOutcome;
}

/// Time left before `deadline`, or a timeout error if none is.
pub(crate) fn remaining(deadline: Instant) -> Result<Duration, StrategyError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(StrategyError::Timeout)
    } else {
        Ok(left)
    }
}

/// Fixed ordered list of strategies.
pub struct StrategyChain {
    strategies: Vec<Box<dyn FetchStrategy>>,
    attempt_timeout: Duration,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>, attempt_timeout: Duration) -> Self {
        Self {
            strategies,
            attempt_timeout,
        }
    }

    /// The standard chain: relays, direct, first-party proxy, URL parse.
    pub fn from_config(config: &ScoutConfig) -> Self {
        let http = HttpClient::new(&config.user_agent, config.attempt_timeout());
        let extractor = Arc::new(HtmlExtractor::new());

        Self::new(
            vec![
                Box::new(RelayStrategy::new(
                    http.clone(),
                    config.relays.clone(),
                    extractor.clone(),
                )),
                Box::new(DirectStrategy::new(http.clone(), extractor.clone())),
                Box::new(FirstPartyProxyStrategy::new(
                    http,
                    config.first_party_proxy.clone(),
                    extractor,
                )),
                Box::new(UrlStructuralStrategy),
            ],
            config.attempt_timeout(),
        )
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Run the strategies in order until one yields a record.
    pub async fn resolve(&self, source_url: &str, external_id: u64) -> Option<PlayerRecord> {
        let target = FetchTarget {
            source_url,
            external_id,
        };

        for strategy in &self.strategies {
            let deadline = Instant::now() + self.attempt_timeout;
            let attempt = AssertUnwindSafe(strategy.attempt(&target, deadline)).catch_unwind();

            let outcome = match tokio::time::timeout_at(deadline, attempt).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(StrategyError::Network(format!(
                    "strategy {} panicked",
                    strategy.name()
                ))),
                Err(_) => Err(StrategyError::Timeout),
            };

            match outcome {
                Ok(record) => {
                    tracing::info!(
                        "acquired player {external_id} via {} ({:?})",
                        strategy.name(),
                        record.origin
                    );
                    return Some(record);
                }
                Err(e) if e.is_expected() => {
                    tracing::debug!("strategy {} skipped for {external_id}: {e}", strategy.name());
                }
                Err(e) => {
                    tracing::warn!("strategy {} failed for {external_id}: {e}", strategy.name());
                }
            }
        }

        tracing::debug!("all strategies exhausted for {external_id}");
        None
    }
}
