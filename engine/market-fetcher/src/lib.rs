//! Marketplace Fetcher
//!
//! Fetches the item catalog and per-item closed-trade statistics from the
//! marketplace REST API. Every response is cached on disk; statistics are
//! reused while the newest cached copy satisfies the freshness policy.

pub mod config;
pub mod fetcher;
pub mod models;

pub use config::{FreshnessPolicy, MarketFetcherConfig};
pub use fetcher::{MarketCacheError, MarketFetcher};
pub use models::*;
