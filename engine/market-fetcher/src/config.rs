use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Item catalog endpoint
pub const DEFAULT_ITEMS_URL: &str = "https://api.warframe.market/v2/items";

/// Statistics endpoint; `{}` is replaced by the item slug
pub const DEFAULT_STATISTICS_URL_FORMAT: &str =
    "https://api.warframe.market/v1/items/{}/statistics";

/// Configuration for the market fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketFetcherConfig {
    /// Item catalog endpoint
    pub items_url: String,

    /// Statistics endpoint template
    pub statistics_url_format: String,

    /// Root of the on-disk response cache
    pub cache_dir: PathBuf,

    /// Fetch the catalog even when a cached copy exists
    pub refresh_items: bool,

    /// When cached statistics may be reused
    pub freshness: FreshnessPolicy,

    /// Pause after every statistics request, in milliseconds
    pub request_delay_ms: u64,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

/// Reuse policy for cached statistics responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreshnessPolicy {
    /// Always fetch a new response
    Refetch,
    /// Reuse the newest cached response if it is at most this many seconds old
    MaxAgeSecs(i64),
}

impl FreshnessPolicy {
    /// One day, the default statistics lifetime
    pub const DAILY: FreshnessPolicy = FreshnessPolicy::MaxAgeSecs(24 * 60 * 60);

    /// `None` when the age does not fit in seconds
    pub fn max_age_hours(hours: i64) -> Option<Self> {
        hours.checked_mul(60 * 60).map(FreshnessPolicy::MaxAgeSecs)
    }

    /// Whether a response saved at `saved_at` can still be used at `now`
    ///
    /// An age limit reaching past the earliest representable time never expires.
    pub fn is_fresh(&self, saved_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            FreshnessPolicy::Refetch => false,
            FreshnessPolicy::MaxAgeSecs(secs) => Duration::try_seconds(*secs)
                .and_then(|age| now.checked_sub_signed(age))
                .map_or(true, |oldest| oldest <= saved_at),
        }
    }
}

impl Default for MarketFetcherConfig {
    fn default() -> Self {
        Self {
            items_url: DEFAULT_ITEMS_URL.to_string(),
            statistics_url_format: DEFAULT_STATISTICS_URL_FORMAT.to_string(),
            cache_dir: PathBuf::from("market"),
            refresh_items: false,
            freshness: FreshnessPolicy::DAILY,
            request_delay_ms: 500,
            timeout_secs: 30,
        }
    }
}

impl MarketFetcherConfig {
    /// Path of the cached item catalog
    pub fn items_path(&self) -> PathBuf {
        self.cache_dir.join("items.json")
    }

    /// Directory holding timestamped statistics responses for one item
    pub fn statistics_dir(&self, slug: &str) -> PathBuf {
        self.cache_dir.join("items").join(slug).join("statistics")
    }

    /// Statistics URL for one item
    pub fn statistics_url(&self, slug: &str) -> String {
        self.statistics_url_format.replace("{}", slug)
    }
}
