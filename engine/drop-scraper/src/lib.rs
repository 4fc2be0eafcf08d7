//! Drop-table scraper
//!
//! Fetches the official drop-table page, parses the mission and relic reward
//! tables, and keeps JSON snapshots (plus CSV exports) on disk so later runs
//! do not hit the page again.

pub mod config;
pub mod export;
pub mod parse;
pub mod scrape;
pub mod types;

pub use config::DropScraperConfig;
pub use parse::{parse_mission_rewards, parse_relic_rewards, ParseError};
pub use scrape::DropScraper;
pub use types::*;
