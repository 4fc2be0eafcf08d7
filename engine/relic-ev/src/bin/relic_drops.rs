use anyhow::Result;
use clap::Parser;
use tracing::info;

use drop_scraper::DropScraper;
use market_fetcher::MarketFetcher;
use relic_ev::{
    inspect_relics, parse_relic_args, render_table, CachedMarket, DropTableProvider, PriceResolver,
    RateCache, RelicEvConfig, RelicIndex, RowOrder, ScrapedDropTables, TableKind,
};

#[derive(Parser)]
#[command(name = "relic-drops")]
#[command(about = "List the Intact rewards of relics with their rates and prices")]
struct Cli {
    /// Relics in shorthand, e.g. `LA1 B2 MC3` for Lith A1, Lith B2, Meso C3
    #[arg(required = true)]
    relics: Vec<String>,

    /// Sort by reward name
    #[arg(long, conflicts_with = "sort_price")]
    sort_name: bool,

    /// Sort by price, most valuable first
    #[arg(long)]
    sort_price: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let relics = parse_relic_args(&cli.relics)?;
    info!("Inspecting {}", relics.join(", "));

    let config = RelicEvConfig::from_env()?;

    let mut drops = ScrapedDropTables::new(DropScraper::new(config.drop_scraper_config())?);
    let index = RelicIndex::from_tables(drops.reward_tables(TableKind::Relics)?)?;

    let market = CachedMarket::new(MarketFetcher::new(config.market_fetcher_config()?)?);
    let mut prices = PriceResolver::new(market, config.aliases.clone())?;

    let order = if cli.sort_name {
        RowOrder::Name
    } else if cli.sort_price {
        RowOrder::Price
    } else {
        RowOrder::Rate
    };

    let rows = inspect_relics(&index, &relics, &mut prices, &mut RateCache::new(), order)?;
    print!("{}", render_table(&rows));

    Ok(())
}
