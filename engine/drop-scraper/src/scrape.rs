use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DropScraperConfig;
use crate::export::{load_snapshot, save_snapshot, write_missions_csv, write_relics_csv};
use crate::parse::{parse_mission_rewards, parse_relic_rewards};
use crate::types::{DropSnapshot, MissionRewards, RelicRewards};

/// Drop-table page scraper with an on-disk snapshot cache
pub struct DropScraper {
    config: DropScraperConfig,
    client: Client,
    /// Page body, fetched at most once per scraper
    page: Option<String>,
}

impl DropScraper {
    /// Create a new drop-table scraper
    pub fn new(config: DropScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client, page: None })
    }

    pub fn config(&self) -> &DropScraperConfig {
        &self.config
    }

    /// Mission reward tables, from the snapshot when available
    pub fn missions(&mut self) -> Result<Vec<MissionRewards>> {
        let path = self.config.missions_path();
        if !self.config.refresh {
            if let Some(snapshot) = load_snapshot::<MissionRewards>(&path)? {
                debug!("Using cached missions from {} ({})", path.display(), snapshot.scraped_at);
                return Ok(snapshot.tables);
            }
        }

        let missions = parse_mission_rewards(self.page()?)?;
        info!("Parsed {} mission locations", missions.len());

        save_snapshot(&path, &DropSnapshot::new(missions.clone()))?;
        write_missions_csv(&self.config.cache_dir.join("missions.csv"), &missions)?;
        info!("Saved missions to {}", path.display());

        Ok(missions)
    }

    /// Relic reward tables, from the snapshot when available
    pub fn relics(&mut self) -> Result<Vec<RelicRewards>> {
        let path = self.config.relics_path();
        if !self.config.refresh {
            if let Some(snapshot) = load_snapshot::<RelicRewards>(&path)? {
                debug!("Using cached relics from {} ({})", path.display(), snapshot.scraped_at);
                return Ok(snapshot.tables);
            }
        }

        let relics = parse_relic_rewards(self.page()?)?;
        info!("Parsed {} relic tables", relics.len());

        save_snapshot(&path, &DropSnapshot::new(relics.clone()))?;
        write_relics_csv(&self.config.cache_dir.join("relics.csv"), &relics)?;
        info!("Saved relics to {}", path.display());

        Ok(relics)
    }

    /// Fetch the drop-table page once and keep the body for later tables
    fn page(&mut self) -> Result<&str> {
        if self.page.is_none() {
            info!("Fetching drop tables from: {}", self.config.url);

            let response =
                self.client.get(&self.config.url).send().context("Failed to fetch drop tables")?;

            if !response.status().is_success() {
                anyhow::bail!("HTTP request failed with status: {}", response.status());
            }

            let html = response.text().context("Failed to read response body")?;
            info!("Successfully fetched HTML ({} bytes)", html.len());
            self.page = Some(html);
        }

        Ok(self.page.as_deref().unwrap_or_default())
    }
}
