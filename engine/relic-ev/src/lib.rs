//! Relic Expected-Value Engine
//!
//! Estimates what opening a relic is worth by combining scraped drop tables
//! with marketplace sale prices. Two figures are produced per relic tier: the
//! probability-weighted average price, and a Monte Carlo estimate of the best
//! reward a full squad can pick from.

pub mod config;
pub mod error;
pub mod ev;
pub mod inspect;
pub mod logging;
pub mod pricing;
pub mod providers;
pub mod rates;
pub mod report;
pub mod tables;

pub use config::{RelicEvConfig, RelicSource};
pub use error::{EvError, PriceFailure, Result};
pub use ev::{EvEngine, SimulationParams};
pub use inspect::{inspect_relics, parse_relic_args, render_table, InspectRow, RowOrder};
pub use pricing::{PriceProvider, PriceResolver};
pub use providers::{CachedMarket, DropTableProvider, MarketSource, ScrapedDropTables};
pub use rates::{parse_rate, Rate, RateCache};
pub use report::{EvReport, ReportKind, ReportPaths, ReportRun};
pub use tables::{RelicIndex, RelicTier, RewardEntry, RewardTable, TableKind};
