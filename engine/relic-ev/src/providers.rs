//! Collaborator seams
//!
//! The core only sees drop tables and market data through these traits. The
//! adapters below back them with the disk-cached scraper and marketplace
//! client; tests substitute in-memory stubs.

use anyhow::Result;
use drop_scraper::{DropScraper, MissionRewards, RelicRewards, RewardRow};
use market_fetcher::{CatalogItem, ItemStatistics, MarketFetcher};
use tracing::debug;

use crate::tables::{RewardEntry, RewardTable, TableKind};

/// Source of reward tables keyed by location
pub trait DropTableProvider {
    /// Ordered `(location, table)` pairs of one kind
    fn reward_tables(&mut self, kind: TableKind) -> Result<Vec<(String, RewardTable)>>;
}

/// Marketplace catalog and per-item trade statistics
pub trait MarketSource {
    fn catalog(&mut self) -> Result<Vec<CatalogItem>>;

    fn statistics(&mut self, item: &CatalogItem) -> Result<ItemStatistics>;
}

/// Drop tables backed by the scraper's snapshot cache
pub struct ScrapedDropTables {
    scraper: DropScraper,
}

impl ScrapedDropTables {
    pub fn new(scraper: DropScraper) -> Self {
        Self { scraper }
    }
}

impl DropTableProvider for ScrapedDropTables {
    fn reward_tables(&mut self, kind: TableKind) -> Result<Vec<(String, RewardTable)>> {
        let tables = match kind {
            TableKind::Missions => flatten_missions(self.scraper.missions()?),
            TableKind::Relics => self.scraper.relics()?.into_iter().map(relic_table).collect(),
        };
        debug!("Loaded {} {:?} tables", tables.len(), kind);
        Ok(tables)
    }
}

/// One table per mission rotation, keyed "<location> / <rotation>"
pub fn flatten_missions(missions: Vec<MissionRewards>) -> Vec<(String, RewardTable)> {
    missions
        .into_iter()
        .flat_map(|mission| {
            let location = mission.location;
            mission.rotations.into_iter().map(move |rotation| {
                let key = match &rotation.rotation {
                    Some(name) => format!("{location} / {name}"),
                    None => location.clone(),
                };
                (key, reward_table(rotation.rewards))
            })
        })
        .collect()
}

fn relic_table(relic: RelicRewards) -> (String, RewardTable) {
    (relic.location, reward_table(relic.rewards))
}

fn reward_table(rows: Vec<RewardRow>) -> RewardTable {
    RewardTable::new(rows.into_iter().map(|row| RewardEntry::new(row.item, row.rate)).collect())
}

/// Market data backed by the fetcher's response cache
pub struct CachedMarket {
    fetcher: MarketFetcher,
}

impl CachedMarket {
    pub fn new(fetcher: MarketFetcher) -> Self {
        Self { fetcher }
    }
}

impl MarketSource for CachedMarket {
    fn catalog(&mut self) -> Result<Vec<CatalogItem>> {
        self.fetcher.items()
    }

    fn statistics(&mut self, item: &CatalogItem) -> Result<ItemStatistics> {
        self.fetcher.statistics(item)
    }
}
