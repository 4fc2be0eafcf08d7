use anyhow::Context;
use clap::ValueEnum;
use drop_scraper::DropScraperConfig;
use market_fetcher::{FreshnessPolicy, MarketFetcherConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ev::SimulationParams;
use crate::pricing::default_aliases;

/// Configuration for a relic EV run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelicEvConfig {
    /// On-disk cache and output locations
    pub data: DataConfig,

    /// Drop-table page settings
    pub drops: DropsConfig,

    /// Marketplace API settings
    pub market: MarketConfig,

    /// Monte Carlo settings
    pub simulation: SimulationConfig,

    /// Report settings
    pub report: ReportConfig,

    /// Reward display name -> catalog display name
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Drop-table snapshots and CSV exports
    pub drops_dir: PathBuf,

    /// Catalog and statistics responses
    pub market_dir: PathBuf,

    /// Report output root
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropsConfig {
    /// Drop-table page URL
    pub url: String,

    /// Scrape again even when snapshots exist
    pub refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub items_url: String,

    /// Statistics URL with `{}` in place of the item slug
    pub statistics_url_format: String,

    /// Cached statistics older than this are refetched (0 = always refetch)
    pub stats_max_age_hours: i64,

    /// Pause after each statistics request
    pub request_delay_ms: u64,

    pub timeout_secs: u64,

    /// Fetch the catalog even when a cached copy exists
    pub refresh_items: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Squad size for best-of-N EV
    pub num_players: u32,

    /// Trials per relic tier
    pub trials: u32,

    /// RNG seed; entropy when unset
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where the list of relics to report on comes from
    pub relic_source: RelicSource,
}

/// Source of the relic names a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RelicSource {
    /// Relics currently rewarded by missions
    Missions,
    /// Every relic with a reward table
    Tables,
}

impl FromStr for RelicSource {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        <RelicSource as ValueEnum>::from_str(value, true)
    }
}

impl Default for RelicEvConfig {
    fn default() -> Self {
        let drops = DropScraperConfig::default();
        let market = MarketFetcherConfig::default();
        let simulation = SimulationParams::default();

        Self {
            data: DataConfig {
                drops_dir: drops.cache_dir,
                market_dir: market.cache_dir,
                out_dir: PathBuf::from("out"),
            },
            drops: DropsConfig { url: drops.url, refresh: false },
            market: MarketConfig {
                items_url: market.items_url,
                statistics_url_format: market.statistics_url_format,
                stats_max_age_hours: 24,
                request_delay_ms: market.request_delay_ms,
                timeout_secs: market.timeout_secs,
                refresh_items: false,
            },
            simulation: SimulationConfig {
                num_players: simulation.num_players,
                trials: simulation.trials,
                seed: None,
            },
            report: ReportConfig { relic_source: RelicSource::Missions },
            aliases: default_aliases(),
        }
    }
}

impl RelicEvConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("RELIC_EV_DROPS_DIR") {
            config.data.drops_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("RELIC_EV_MARKET_DIR") {
            config.data.market_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("RELIC_EV_OUT_DIR") {
            config.data.out_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("RELIC_EV_DROPS_URL") {
            config.drops.url = url;
        }

        if let Some(hours) = parse_env("RELIC_EV_STATS_MAX_AGE_HOURS")? {
            config.market.stats_max_age_hours = hours;
        }

        if let Some(trials) = parse_env("RELIC_EV_TRIALS")? {
            config.simulation.trials = trials;
        }

        if let Some(players) = parse_env("RELIC_EV_PLAYERS")? {
            config.simulation.num_players = players;
        }

        if let Some(seed) = parse_env("RELIC_EV_SEED")? {
            config.simulation.seed = Some(seed);
        }

        if let Ok(source) = std::env::var("RELIC_EV_RELIC_SOURCE") {
            config.report.relic_source = source.parse().map_err(|e| {
                anyhow::anyhow!("Invalid RELIC_EV_RELIC_SOURCE '{}': {}", source, e)
            })?;
        }

        Ok(config)
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            num_players: self.simulation.num_players,
            trials: self.simulation.trials,
        }
    }

    /// Scraper settings derived from this configuration
    pub fn drop_scraper_config(&self) -> DropScraperConfig {
        DropScraperConfig {
            url: self.drops.url.clone(),
            cache_dir: self.data.drops_dir.clone(),
            refresh: self.drops.refresh,
            ..Default::default()
        }
    }

    /// Marketplace client settings derived from this configuration
    pub fn market_fetcher_config(&self) -> anyhow::Result<MarketFetcherConfig> {
        let freshness = match self.market.stats_max_age_hours {
            hours if hours <= 0 => FreshnessPolicy::Refetch,
            hours => FreshnessPolicy::max_age_hours(hours)
                .with_context(|| format!("Statistics max age of {} hours is too large", hours))?,
        };

        Ok(MarketFetcherConfig {
            items_url: self.market.items_url.clone(),
            statistics_url_format: self.market.statistics_url_format.clone(),
            cache_dir: self.data.market_dir.clone(),
            refresh_items: self.market.refresh_items,
            freshness,
            request_delay_ms: self.market.request_delay_ms,
            timeout_secs: self.market.timeout_secs,
        })
    }
}

fn parse_env<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid {} '{}'", name, value)),
        Err(_) => Ok(None),
    }
}
