//! Reward pricing
//!
//! A reward's display name is matched against the marketplace catalog, first
//! exactly, then through a small alias table, then without a trailing
//! " Blueprint". Its price is the median of the most recent daily bucket of
//! closed trades.

use chrono::NaiveDateTime;
use market_fetcher::{CatalogItem, StatisticsEntry};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{EvError, PriceFailure, Result};
use crate::providers::MarketSource;

/// Suffix that the catalog omits for some blueprint rewards
const BLUEPRINT_SUFFIX: &str = " Blueprint";

/// Only UTC midnight-aligned buckets are expected in the daily series
const STATISTICS_TIME_SUFFIX: &str = ".000+00:00";
const STATISTICS_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Maps a reward display name to a market price
pub trait PriceProvider {
    fn resolve_price(&mut self, reward: &str) -> Result<f64>;
}

/// Catalog-backed price lookup with per-run memo tables
pub struct PriceResolver<S: MarketSource> {
    source: S,
    /// Catalog entries by English display name; first entry wins
    catalog: HashMap<String, CatalogItem>,
    aliases: HashMap<String, String>,
    /// Memo by reward display name
    by_reward: HashMap<String, f64>,
    /// Memo by catalog slug; `None` records an empty statistics series
    by_slug: HashMap<String, Option<f64>>,
}

impl<S: MarketSource> PriceResolver<S> {
    /// Load the catalog from the source and start with empty memo tables
    pub fn new(mut source: S, aliases: HashMap<String, String>) -> Result<Self> {
        let items = source.catalog()?;
        let mut catalog = HashMap::with_capacity(items.len());
        for item in items {
            if let Some(name) = item.name() {
                catalog.entry(name.to_string()).or_insert_with(|| item.clone());
            }
        }
        info!("Loaded {} catalog items for price lookup", catalog.len());

        Ok(Self {
            source,
            catalog,
            aliases,
            by_reward: HashMap::new(),
            by_slug: HashMap::new(),
        })
    }

    /// Seed the slug memo, e.g. with prices known from an earlier run
    pub fn with_prices(mut self, prices: impl IntoIterator<Item = (String, f64)>) -> Self {
        self.by_slug.extend(prices.into_iter().map(|(slug, price)| (slug, Some(price))));
        self
    }

    /// Catalog entry for a reward name after alias and blueprint fallback
    pub fn find_item(&self, reward: &str) -> Option<&CatalogItem> {
        if let Some(item) = self.catalog.get(reward) {
            return Some(item);
        }

        let fallback = match self.aliases.get(reward) {
            Some(alias) => alias.as_str(),
            None => reward.strip_suffix(BLUEPRINT_SUFFIX)?,
        };
        debug!("Retrying '{}' as '{}'", reward, fallback);
        self.catalog.get(fallback)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn slug_price(&mut self, reward: &str, item: &CatalogItem) -> Result<Option<f64>> {
        if let Some(price) = self.by_slug.get(&item.slug) {
            return Ok(*price);
        }

        let statistics = self
            .source
            .statistics(item)
            .map_err(|e| EvError::price(reward, PriceFailure::Lookup(format!("{e:#}"))))?;
        let price =
            latest_median(statistics.daily()).map_err(|reason| EvError::price(reward, reason))?;

        debug!("Price of {} is {:?}", item.slug, price);
        self.by_slug.insert(item.slug.clone(), price);
        Ok(price)
    }
}

impl<S: MarketSource> PriceProvider for PriceResolver<S> {
    fn resolve_price(&mut self, reward: &str) -> Result<f64> {
        if let Some(price) = self.by_reward.get(reward) {
            return Ok(*price);
        }

        let item = self
            .find_item(reward)
            .cloned()
            .ok_or_else(|| EvError::price(reward, PriceFailure::NotInCatalog))?;

        let price = self.slug_price(reward, &item)?.ok_or_else(|| {
            EvError::price(reward, PriceFailure::UnknownPrice { slug: item.slug.clone() })
        })?;

        self.by_reward.insert(reward.to_string(), price);
        Ok(price)
    }
}

/// Median of the most recent entry; `None` for an empty series
pub fn latest_median(
    entries: &[StatisticsEntry],
) -> std::result::Result<Option<f64>, PriceFailure> {
    let mut latest: Option<(NaiveDateTime, f64)> = None;

    for entry in entries {
        let bad_timestamp = || PriceFailure::BadTimestamp { datetime: entry.datetime.clone() };
        let trimmed =
            entry.datetime.strip_suffix(STATISTICS_TIME_SUFFIX).ok_or_else(bad_timestamp)?;
        let time = NaiveDateTime::parse_from_str(trimmed, STATISTICS_TIME_FORMAT)
            .map_err(|_| bad_timestamp())?;

        if latest.map_or(true, |(latest_time, _)| time > latest_time) {
            latest = Some((time, entry.median));
        }
    }

    Ok(latest.map(|(_, median)| median))
}

/// Reward names the drop tables print differently from the catalog
pub fn default_aliases() -> HashMap<String, String> {
    [
        ("Kavasa Prime Kubrow Collar Blueprint", "Kavasa Prime Collar Blueprint"),
        ("Kavasa Prime Buckle", "Kavasa Prime Collar Buckle"),
        ("Kavasa Prime Band", "Kavasa Prime Collar Band"),
    ]
    .into_iter()
    .map(|(reward, catalog)| (reward.to_string(), catalog.to_string()))
    .collect()
}
