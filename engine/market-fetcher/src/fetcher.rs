use crate::config::MarketFetcherConfig;
use crate::models::*;
use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use thiserror::Error;
use tracing::{debug, info};

/// File name format of cached statistics responses (UTC save time)
pub const CACHE_FILE_FORMAT: &str = "%Y-%m-%dT%H.%M.%S.json";

/// Cache-layout problems that must not be papered over
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarketCacheError {
    #[error("Invalid item slug {0}")]
    InvalidSlug(String),

    #[error("Unrecognized statistics cache file {0}")]
    UnrecognizedCacheFile(String),
}

/// Marketplace client with a disk cache in front of every request
pub struct MarketFetcher {
    config: MarketFetcherConfig,
    client: Client,
}

impl MarketFetcher {
    /// Create a new fetcher instance
    pub fn new(config: MarketFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &MarketFetcherConfig {
        &self.config
    }

    /// Item catalog, from the cache unless a refresh was requested
    pub fn items(&self) -> Result<Vec<CatalogItem>> {
        let path = self.config.items_path();
        if !self.config.refresh_items && path.is_file() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let items: Vec<CatalogItem> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            debug!("Loaded {} catalog items from {}", items.len(), path.display());
            return Ok(items);
        }

        let items = self.fetch_items()?;

        fs::create_dir_all(&self.config.cache_dir)?;
        fs::write(&path, serde_json::to_string_pretty(&items)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved {} catalog items to {}", items.len(), path.display());

        Ok(items)
    }

    /// Fetch the item catalog from the marketplace
    pub fn fetch_items(&self) -> Result<Vec<CatalogItem>> {
        info!("Fetching item catalog from: {}", self.config.items_url);

        let response = self
            .client
            .get(&self.config.items_url)
            .send()
            .context("Failed to fetch item catalog")?;

        if !response.status().is_success() {
            anyhow::bail!("API request failed with status: {}", response.status());
        }

        let items: ItemsResponse = response.json().context("Failed to parse item catalog JSON")?;

        info!("Successfully fetched {} catalog items", items.data.len());
        Ok(items.data)
    }

    /// Statistics for one item, honoring the freshness policy
    pub fn statistics(&self, item: &CatalogItem) -> Result<ItemStatistics> {
        self.statistics_at(item, Utc::now().naive_utc())
    }

    fn statistics_at(&self, item: &CatalogItem, now: NaiveDateTime) -> Result<ItemStatistics> {
        validate_slug(&item.slug)?;

        let dir = self.config.statistics_dir(&item.slug);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        if let Some((saved_at, path)) = latest_cache_file(&dir)? {
            if self.config.freshness.is_fresh(saved_at, now) {
                debug!("Using cached statistics for {} from {}", item.slug, path.display());
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                return serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()));
            }
        }

        let body = self.fetch_statistics_body(&item.slug)?;
        std::thread::sleep(StdDuration::from_millis(self.config.request_delay_ms));

        let path = dir.join(now.format(CACHE_FILE_FORMAT).to_string());
        fs::write(&path, &body).with_context(|| format!("Failed to write {}", path.display()))?;

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse statistics for {}", item.slug))
    }

    fn fetch_statistics_body(&self, slug: &str) -> Result<String> {
        let url = self.config.statistics_url(slug);
        info!("Fetching statistics from: {}", url);

        let response = self.client.get(&url).send().context("Failed to fetch statistics")?;

        if !response.status().is_success() {
            anyhow::bail!("API request failed with status: {}", response.status());
        }

        response.text().context("Failed to read statistics body")
    }
}

/// Slugs become path components, so only `[A-Za-z0-9_]+` is accepted
pub fn validate_slug(slug: &str) -> Result<(), MarketCacheError> {
    if slug.is_empty() || !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MarketCacheError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Newest timestamped file in a statistics cache directory
fn latest_cache_file(dir: &Path) -> Result<Option<(NaiveDateTime, PathBuf)>> {
    let mut latest: Option<(NaiveDateTime, PathBuf)> = None;

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let saved_at = NaiveDateTime::parse_from_str(&file_name, CACHE_FILE_FORMAT)
            .map_err(|_| MarketCacheError::UnrecognizedCacheFile(path.display().to_string()))?;

        if latest.as_ref().map_or(true, |(time, _)| saved_at > *time) {
            latest = Some((saved_at, path));
        }
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FreshnessPolicy;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const STATS: &str = r#"{"payload": {"statistics_closed": {"90days": [
        {"datetime": "2024-05-01T00:00:00.000+00:00", "median": 42.0}
    ]}}}"#;

    fn offline_fetcher(cache_dir: &Path, freshness: FreshnessPolicy) -> MarketFetcher {
        MarketFetcher::new(MarketFetcherConfig {
            // Unroutable: any fetch attempt fails the test
            items_url: "http://127.0.0.1:9/v2/items".to_string(),
            statistics_url_format: "http://127.0.0.1:9/v1/items/{}/statistics".to_string(),
            cache_dir: cache_dir.to_path_buf(),
            freshness,
            request_delay_ms: 0,
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn seed_stats(fetcher: &MarketFetcher, slug: &str, saved_at: NaiveDateTime, body: &str) {
        let dir = fetcher.config().statistics_dir(slug);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(saved_at.format(CACHE_FILE_FORMAT).to_string()), body).unwrap();
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("akstiletto_prime_barrel").is_ok());
        assert!(validate_slug("Lith_A1").is_ok());
        assert_eq!(
            validate_slug("../etc"),
            Err(MarketCacheError::InvalidSlug("../etc".to_string()))
        );
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_fresh_statistics_come_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = offline_fetcher(temp_dir.path(), FreshnessPolicy::DAILY);
        let item = CatalogItem::new("lith_a1_relic", "Lith A1 Relic");

        let stale = r#"{"payload": {"statistics_closed": {}}}"#;
        seed_stats(&fetcher, "lith_a1_relic", at(1, 0), stale);
        seed_stats(&fetcher, "lith_a1_relic", at(2, 0), STATS);

        let stats = fetcher.statistics_at(&item, at(2, 6)).unwrap();
        assert_eq!(stats.daily().len(), 1);
        assert_eq!(stats.daily()[0].median, 42.0);
    }

    #[test]
    fn test_stale_statistics_are_refetched() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = offline_fetcher(temp_dir.path(), FreshnessPolicy::DAILY);
        let item = CatalogItem::new("lith_a1_relic", "Lith A1 Relic");

        seed_stats(&fetcher, "lith_a1_relic", at(1, 0), STATS);

        // Network is unreachable, so a refetch attempt surfaces as an error
        assert!(fetcher.statistics_at(&item, at(3, 0)).is_err());
    }

    #[test]
    fn test_unrecognized_cache_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = offline_fetcher(temp_dir.path(), FreshnessPolicy::DAILY);
        let item = CatalogItem::new("lith_a1_relic", "Lith A1 Relic");

        let dir = fetcher.config().statistics_dir("lith_a1_relic");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let err = fetcher.statistics_at(&item, at(2, 0)).unwrap_err();
        assert!(err.downcast_ref::<MarketCacheError>().is_some());
    }

    #[test]
    fn test_cached_items() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = offline_fetcher(temp_dir.path(), FreshnessPolicy::DAILY);

        let items = vec![CatalogItem::new("forma", "Forma")];
        fs::write(fetcher.config().items_path(), serde_json::to_string(&items).unwrap()).unwrap();

        assert_eq!(fetcher.items().unwrap(), items);
    }
}
