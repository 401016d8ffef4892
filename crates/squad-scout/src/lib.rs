//! Squad Scout: best-effort acquisition of third-party player profiles.
//!
//! The source site has no public API, so profiles are fetched through an
//! ordered chain of fallbacks (public relays, a direct request, an optional
//! first-party relay, and finally a network-free parse of the URL itself),
//! behind a TTL cache and a fixed-window rate limiter.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod rate_limit;
pub mod scout;
pub mod strategy;
pub mod types;

pub use cache::PlayerCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Envelope, RelayConfig, ScoutConfig};
pub use error::{ConfigError, StrategyError, StrategyOutcome};
pub use extract::HtmlExtractor;
pub use rate_limit::RateLimiter;
pub use scout::{PlayerScout, PlayerScoutBuilder};
pub use strategy::{FetchStrategy, FetchTarget, StrategyChain};
pub use types::*;
