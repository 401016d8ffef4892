//! Acquisition facade.
//!
//! The single entry point for callers: cache lookup, then the rate limiter,
//! then the strategy chain with write-through on success. Every failure
//! along the way collapses to `None`.
//!
//! Concurrent calls for the same identifier are not coalesced; each one
//! that misses the cache takes its own rate-limit permit and runs the chain.

use crate::cache::PlayerCache;
use crate::clock::{Clock, SystemClock};
use crate::config::ScoutConfig;
use crate::error::StrategyError;
use crate::rate_limit::RateLimiter;
use crate::strategy::{FetchStrategy, StrategyChain};
use crate::types::{CacheStats, PlayerRecord, RateWindowStatus};
use std::sync::Arc;
use std::time::Duration;

/// Best-effort player profile client. Create once and share.
pub struct PlayerScout {
    cache: PlayerCache,
    limiter: RateLimiter,
    chain: StrategyChain,
}

impl PlayerScout {
    /// A scout with the standard strategy chain and the system clock.
    pub fn new(config: &ScoutConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: &ScoutConfig) -> PlayerScoutBuilder {
        PlayerScoutBuilder {
            config: config.clone(),
            clock: None,
            strategies: None,
        }
    }

    /// Fetch a player profile, or `None` if nothing could be acquired.
    pub async fn fetch_player_data(
        &self,
        source_url: &str,
        external_id: u64,
    ) -> Option<PlayerRecord> {
        if let Some(record) = self.cache.get(external_id) {
            tracing::debug!("cache hit for player {external_id}");
            return Some(record);
        }

        if !self.limiter.try_acquire() {
            let denied = StrategyError::RateLimitExceeded {
                max: self.limiter.max_requests(),
            };
            tracing::warn!("dropping fetch for player {external_id}: {denied}");
            return None;
        }

        let record = self.chain.resolve(source_url, external_id).await?;
        self.cache.put(external_id, record.clone());
        Some(record)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("player cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn rate_limiter_status(&self) -> RateWindowStatus {
        self.limiter.status()
    }

    /// Names of the strategies, in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.chain.strategy_names()
    }
}

/// Builder for a [`PlayerScout`] with a custom clock or strategy list.
pub struct PlayerScoutBuilder {
    config: ScoutConfig,
    clock: Option<Arc<dyn Clock>>,
    strategies: Option<Vec<Box<dyn FetchStrategy>>>,
}

impl PlayerScoutBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the standard chain with these strategies, tried in order.
    pub fn strategies(mut self, strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn build(self) -> PlayerScout {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let chain = match self.strategies {
            Some(strategies) => StrategyChain::new(strategies, self.config.attempt_timeout()),
            None => StrategyChain::from_config(&self.config),
        };

        tracing::debug!(
            "player scout ready: ttl={:?} limit={}/{:?} chain={:?}",
            self.config.cache_ttl(),
            self.config.rate_limit.max_requests,
            self.config.rate_window(),
            chain.strategy_names()
        );

        PlayerScout {
            cache: PlayerCache::new(self.config.cache_ttl(), clock.clone()),
            limiter: RateLimiter::new(
                self.config.rate_limit.max_requests,
                Duration::from_millis(self.config.rate_limit.window_ms),
                clock,
            ),
            chain,
        }
    }
}
