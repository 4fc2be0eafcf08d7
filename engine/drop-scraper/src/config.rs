use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Official drop-table page
pub const DEFAULT_DROPS_URL: &str = "https://www.warframe.com/droptables";

/// Desktop browser user agent sent with the page request
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
);

/// Configuration for the drop-table scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropScraperConfig {
    /// Page holding every drop table
    pub url: String,

    /// Directory for the JSON snapshots and CSV exports
    pub cache_dir: PathBuf,

    /// Ignore cached snapshots and scrape the page again
    pub refresh: bool,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with the page request
    pub user_agent: String,
}

impl Default for DropScraperConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DROPS_URL.to_string(),
            cache_dir: PathBuf::from("drops"),
            refresh: false,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DropScraperConfig {
    /// Path of the missions JSON snapshot
    pub fn missions_path(&self) -> PathBuf {
        self.cache_dir.join("missions.json")
    }

    /// Path of the relics JSON snapshot
    pub fn relics_path(&self) -> PathBuf {
        self.cache_dir.join("relics.json")
    }
}
