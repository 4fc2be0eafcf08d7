use market_fetcher::{MarketFetcher, MarketFetcherConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Refreshing marketplace item catalog");

    let mut config = MarketFetcherConfig { refresh_items: true, ..Default::default() };
    if let Ok(dir) = std::env::var("RELIC_EV_MARKET_DIR") {
        config.cache_dir = dir.into();
    }

    let fetcher = MarketFetcher::new(config)?;
    let items = fetcher.items()?;

    println!("Saved {} catalog items to {}", items.len(), fetcher.config().items_path().display());
    Ok(())
}
