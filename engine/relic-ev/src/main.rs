//! Relic EV report runner
//!
//! Loads drop tables and market prices (from the disk caches when they are
//! fresh), then writes the weighted and best-of-squad EV reports.

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

use drop_scraper::DropScraper;
use market_fetcher::MarketFetcher;
use relic_ev::logging::{initialize_logging, LogFormat};
use relic_ev::{
    CachedMarket, PriceResolver, RelicEvConfig, RelicSource, ReportRun, ScrapedDropTables,
};

#[derive(Parser)]
#[command(name = "relic-ev")]
#[command(about = "Expected market value of relics per refinement tier")]
#[command(version)]
struct Cli {
    /// Drop-table snapshot directory
    #[arg(long)]
    drops_dir: Option<PathBuf>,

    /// Market response cache directory
    #[arg(long)]
    market_dir: Option<PathBuf>,

    /// Report output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Scrape the drop tables even when snapshots exist
    #[arg(long)]
    refresh_drops: bool,

    /// Fetch the item catalog even when a cached copy exists
    #[arg(long)]
    refresh_items: bool,

    /// Refetch statistics older than this many hours (0 = always)
    #[arg(long)]
    stats_max_age_hours: Option<i64>,

    /// Monte Carlo trials per relic tier
    #[arg(long)]
    trials: Option<u32>,

    /// Squad size for the best-of-squad report
    #[arg(long)]
    players: Option<u32>,

    /// Seed for reproducible Monte Carlo runs
    #[arg(long)]
    seed: Option<u64>,

    /// Where the relic list comes from
    #[arg(long, value_enum)]
    relic_source: Option<RelicSource>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

impl Cli {
    fn apply(self, config: &mut RelicEvConfig) {
        if let Some(dir) = self.drops_dir {
            config.data.drops_dir = dir;
        }
        if let Some(dir) = self.market_dir {
            config.data.market_dir = dir;
        }
        if let Some(dir) = self.out_dir {
            config.data.out_dir = dir;
        }
        config.drops.refresh |= self.refresh_drops;
        config.market.refresh_items |= self.refresh_items;
        if let Some(hours) = self.stats_max_age_hours {
            config.market.stats_max_age_hours = hours;
        }
        if let Some(trials) = self.trials {
            config.simulation.trials = trials;
        }
        if let Some(players) = self.players {
            config.simulation.num_players = players;
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
        if let Some(source) = self.relic_source {
            config.report.relic_source = source;
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    initialize_logging(cli.log_format)?;

    info!("Starting Relic EV v{}", env!("CARGO_PKG_VERSION"));

    let mut config = RelicEvConfig::from_env().context("Failed to load configuration")?;
    cli.apply(&mut config);
    info!("Loaded configuration: {:?}", config);

    let mut drops = ScrapedDropTables::new(DropScraper::new(config.drop_scraper_config())?);
    let market = CachedMarket::new(MarketFetcher::new(config.market_fetcher_config()?)?);
    let prices = PriceResolver::new(market, config.aliases.clone())?;

    let mut run = ReportRun::prepare(
        &mut drops,
        config.report.relic_source,
        prices,
        config.simulation_params(),
    )?;

    let mut rng = match config.simulation.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let paths = run.run(&config.data.out_dir, &mut rng)?;

    println!("\nReports:");
    println!("- Weighted EV: {}", paths.weighted.display());
    println!("- Best of {} EV: {}", config.simulation.num_players, paths.multiplayer.display());

    info!("Relic EV run completed for {} relics", run.relics().len());
    Ok(())
}
