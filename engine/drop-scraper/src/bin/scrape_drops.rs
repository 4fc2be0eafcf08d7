use anyhow::Result;
use drop_scraper::{DropScraper, DropScraperConfig};
use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting drop-table scraper...");

    let mut config = DropScraperConfig { refresh: true, ..Default::default() };
    if let Ok(url) = std::env::var("RELIC_EV_DROPS_URL") {
        config.url = url;
    }
    if let Ok(dir) = std::env::var("RELIC_EV_DROPS_DIR") {
        config.cache_dir = dir.into();
    }

    let mut scraper = DropScraper::new(config)?;

    let missions = scraper.missions()?;
    let relics = scraper.relics()?;

    let relic_rewards: usize = relics.iter().map(|relic| relic.rewards.len()).sum();
    let mission_rewards: usize = missions.iter().map(|mission| mission.rows().count()).sum();

    println!("\nSummary:");
    println!("- Mission locations: {} ({} reward rows)", missions.len(), mission_rewards);
    println!("- Relic tables: {} ({} reward rows)", relics.len(), relic_rewards);
    println!("- Saved to: {}", scraper.config().cache_dir.display());

    info!("Scraping completed successfully!");
    Ok(())
}
