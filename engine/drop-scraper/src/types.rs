use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a drop table: the reward name and its free-text rate label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRow {
    /// Reward display name (e.g., "Axi A1 Relic")
    pub item: String,
    /// Rate label as printed on the page (e.g., "Uncommon (11.06%)")
    pub rate: String,
}

/// Rewards for a single rotation of a mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRewards {
    /// Rotation header (e.g., "Rotation A"); missing for single-table missions
    pub rotation: Option<String>,
    pub rewards: Vec<RewardRow>,
}

/// Reward tables for one mission location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionRewards {
    /// Location header (e.g., "Mercury/Apollodorus (Survival)")
    pub location: String,
    pub rotations: Vec<RotationRewards>,
}

/// Reward table for one relic refinement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelicRewards {
    /// Location header (e.g., "Lith A1 Relic (Intact)")
    pub location: String,
    pub rewards: Vec<RewardRow>,
}

/// Container for a scraped table set as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropSnapshot<T> {
    /// When the page was scraped
    pub scraped_at: DateTime<Utc>,
    pub tables: Vec<T>,
}

impl<T> DropSnapshot<T> {
    /// Wrap freshly scraped tables
    pub fn new(tables: Vec<T>) -> Self {
        Self { scraped_at: Utc::now(), tables }
    }
}

impl MissionRewards {
    /// Every reward row of every rotation, in page order
    pub fn rows(&self) -> impl Iterator<Item = &RewardRow> {
        self.rotations.iter().flat_map(|rotation| rotation.rewards.iter())
    }
}
