use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::error::{EvError, Result};

/// Reward with no resale value; never priced, never counted toward rates
pub const FORMA_BLUEPRINT: &str = "Forma Blueprint";

/// Suffix of relic rewards in mission tables and of relic table locations
const RELIC_SUFFIX: &str = " Relic";

/// One row of a reward table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    /// Reward display name as printed in the drop tables
    pub item: String,
    /// Free-text rate label (e.g., "Rare (2.00%)")
    pub rate_label: String,
}

impl RewardEntry {
    pub fn new(item: impl Into<String>, rate_label: impl Into<String>) -> Self {
        Self { item: item.into(), rate_label: rate_label.into() }
    }

    /// Whether this entry takes part in EV math
    pub fn is_included(&self) -> bool {
        self.item != FORMA_BLUEPRINT
    }
}

/// Ordered rewards of one location
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardTable {
    entries: Vec<RewardEntry>,
}

impl RewardTable {
    pub fn new(entries: Vec<RewardEntry>) -> Self {
        Self { entries }
    }

    /// Build a table from `(item, rate label)` pairs
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(item, rate)| RewardEntry::new(item, rate)).collect())
    }

    /// Every entry in table order
    pub fn entries(&self) -> &[RewardEntry] {
        &self.entries
    }

    /// Entries that carry value, in table order
    pub fn included(&self) -> impl Iterator<Item = &RewardEntry> {
        self.entries.iter().filter(|entry| entry.is_included())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which drop tables a provider should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Missions,
    Relics,
}

/// Relic refinement tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelicTier {
    Intact,
    Exceptional,
    Flawless,
    Radiant,
}

impl RelicTier {
    /// All tiers in report order
    pub const ALL: [RelicTier; 4] =
        [RelicTier::Intact, RelicTier::Exceptional, RelicTier::Flawless, RelicTier::Radiant];

    pub fn name(&self) -> &'static str {
        match self {
            RelicTier::Intact => "Intact",
            RelicTier::Exceptional => "Exceptional",
            RelicTier::Flawless => "Flawless",
            RelicTier::Radiant => "Radiant",
        }
    }

    /// Table location of this tier for a relic (e.g., "Lith A1 Relic (Intact)")
    pub fn location_for(&self, relic: &str) -> String {
        format!("{relic}{RELIC_SUFFIX} ({})", self.name())
    }
}

impl fmt::Display for RelicTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relic reward tables by location
#[derive(Debug, Default)]
pub struct RelicIndex {
    tables: HashMap<String, RewardTable>,
    /// Locations in provider order
    locations: Vec<String>,
}

impl RelicIndex {
    /// Index provider tables; a repeated location is an integrity failure
    pub fn from_tables(tables: Vec<(String, RewardTable)>) -> Result<Self> {
        check_unique_locations(&tables)?;

        let mut index = Self::default();
        for (location, table) in tables {
            index.locations.push(location.clone());
            index.tables.insert(location, table);
        }
        Ok(index)
    }

    pub fn get(&self, location: &str) -> Result<&RewardTable> {
        self.tables.get(location).ok_or_else(|| EvError::UnknownLocation(location.to_string()))
    }

    /// Table of one relic tier
    pub fn tier(&self, relic: &str, tier: RelicTier) -> Result<&RewardTable> {
        self.get(&tier.location_for(relic))
    }

    /// Relic base names of every indexed location, sorted and de-duplicated
    pub fn relic_names(&self) -> Vec<String> {
        relics_from_locations(self.locations.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Fails on the first location that appears twice
pub fn check_unique_locations(tables: &[(String, RewardTable)]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tables.len());
    for (location, _) in tables {
        if !seen.insert(location.as_str()) {
            return Err(EvError::DuplicateLocation(location.clone()));
        }
    }
    Ok(())
}

/// Relics currently dropping: every mission reward named "<relic> Relic"
pub fn relics_from_missions(missions: &[(String, RewardTable)]) -> Vec<String> {
    let names: BTreeSet<String> = missions
        .iter()
        .flat_map(|(_, table)| table.entries())
        .filter_map(|entry| entry.item.strip_suffix(RELIC_SUFFIX))
        .map(str::to_string)
        .collect();
    names.into_iter().collect()
}

/// Relic base names from relic table locations ("<relic> Relic (<tier>)")
pub fn relics_from_locations<'a>(locations: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: BTreeSet<String> = locations
        .into_iter()
        .filter_map(|location| location.find(RELIC_SUFFIX).map(|end| location[..end].to_string()))
        .collect();
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relic_tables(relic: &str) -> Vec<(String, RewardTable)> {
        RelicTier::ALL
            .iter()
            .map(|tier| {
                let table = RewardTable::from_pairs([("Forma Blueprint", "(25.33%)")]);
                (tier.location_for(relic), table)
            })
            .collect()
    }

    #[test]
    fn test_tier_locations() {
        assert_eq!(RelicTier::Intact.location_for("Lith A1"), "Lith A1 Relic (Intact)");
        assert_eq!(RelicTier::Radiant.location_for("Axi Z9"), "Axi Z9 Relic (Radiant)");
        assert!(RelicTier::Intact < RelicTier::Radiant);
    }

    #[test]
    fn test_included_skips_forma() {
        let table = RewardTable::from_pairs([
            ("Forma Blueprint", "(25%)"),
            ("ItemA", "(75%)"),
        ]);
        let included: Vec<&str> = table.included().map(|entry| entry.item.as_str()).collect();
        assert_eq!(included, vec!["ItemA"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_relic_index_lookup() {
        let mut tables = relic_tables("Lith A1");
        tables.extend(relic_tables("Meso B2"));
        let index = RelicIndex::from_tables(tables).unwrap();

        assert_eq!(index.len(), 8);
        assert!(index.tier("Lith A1", RelicTier::Flawless).is_ok());
        assert!(matches!(
            index.tier("Neo C3", RelicTier::Intact),
            Err(EvError::UnknownLocation(location)) if location == "Neo C3 Relic (Intact)"
        ));
        assert_eq!(index.relic_names(), vec!["Lith A1".to_string(), "Meso B2".to_string()]);
    }

    #[test]
    fn test_relic_index_rejects_duplicate_location() {
        let mut tables = relic_tables("Lith A1");
        tables.push(("Lith A1 Relic (Intact)".to_string(), RewardTable::default()));

        match RelicIndex::from_tables(tables) {
            Err(EvError::DuplicateLocation(location)) => {
                assert_eq!(location, "Lith A1 Relic (Intact)")
            }
            other => panic!("expected DuplicateLocation, got {other:?}"),
        }
    }

    #[test]
    fn test_relics_from_missions() {
        let missions = vec![
            (
                "Mercury/Apollodorus (Survival) / Rotation A".to_string(),
                RewardTable::from_pairs([("Meso B2 Relic", "(11.11%)"), ("Endo", "(50.00%)")]),
            ),
            (
                "Venus/Romula (Defense)".to_string(),
                RewardTable::from_pairs([
                    ("Lith A1 Relic", "(3.33%)"),
                    ("Meso B2 Relic", "(3.33%)"),
                ]),
            ),
        ];

        let relics = relics_from_missions(&missions);
        assert_eq!(relics, vec!["Lith A1".to_string(), "Meso B2".to_string()]);
    }

    #[test]
    fn test_check_unique_locations() {
        let mut missions = vec![
            ("M".to_string(), RewardTable::from_pairs([("Lith A1 Relic", "(100%)")])),
            ("N".to_string(), RewardTable::default()),
        ];
        assert!(check_unique_locations(&missions).is_ok());

        missions.push(("M".to_string(), RewardTable::from_pairs([("Meso B2 Relic", "(100%)")])));
        assert!(matches!(
            check_unique_locations(&missions),
            Err(EvError::DuplicateLocation(location)) if location == "M"
        ));
    }
}
