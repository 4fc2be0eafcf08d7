use std::collections::HashMap;
use std::fs;

use market_fetcher::{CatalogItem, ItemStatistics, StatisticsEntry};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use relic_ev::pricing::default_aliases;
use relic_ev::{
    DropTableProvider, EvError, MarketSource, PriceResolver, RelicSource, RelicTier, ReportRun,
    RewardTable, SimulationParams, TableKind,
};
use tempfile::TempDir;

struct StubDrops {
    missions: Vec<(String, RewardTable)>,
    relics: Vec<(String, RewardTable)>,
}

impl DropTableProvider for StubDrops {
    fn reward_tables(&mut self, kind: TableKind) -> anyhow::Result<Vec<(String, RewardTable)>> {
        Ok(match kind {
            TableKind::Missions => self.missions.clone(),
            TableKind::Relics => self.relics.clone(),
        })
    }
}

struct StubMarket {
    medians: HashMap<String, f64>,
}

impl MarketSource for StubMarket {
    fn catalog(&mut self) -> anyhow::Result<Vec<CatalogItem>> {
        Ok(["ItemA", "ItemB", "ItemC", "ItemD"]
            .iter()
            .map(|name| CatalogItem::new(name.to_lowercase(), *name))
            .collect())
    }

    fn statistics(&mut self, item: &CatalogItem) -> anyhow::Result<ItemStatistics> {
        let entries = self
            .medians
            .get(&item.slug)
            .map(|median| vec![StatisticsEntry::new("2024-05-01T00:00:00.000+00:00", *median)])
            .unwrap_or_default();
        Ok(ItemStatistics::from_daily(entries))
    }
}

fn percent(value: u32) -> String {
    format!("({value}.00%)")
}

/// Forma, ItemA and ItemB percentages per tier, Intact first
const LITH_A1_TIERS: [(u32, u32, u32); 4] =
    [(25, 50, 25), (25, 45, 30), (20, 45, 35), (20, 40, 40)];

fn relic_tables() -> Vec<(String, RewardTable)> {
    let mut tables = Vec::new();
    for (tier, (forma, a, b)) in RelicTier::ALL.iter().zip(LITH_A1_TIERS) {
        tables.push((
            tier.location_for("Lith A1"),
            RewardTable::from_pairs([
                ("Forma Blueprint".to_string(), percent(forma)),
                ("ItemA".to_string(), percent(a)),
                ("ItemB".to_string(), percent(b)),
            ]),
        ));
    }
    for tier in RelicTier::ALL {
        let meso = RewardTable::from_pairs([("ItemC", "Common (100.00%)")]);
        let neo = RewardTable::from_pairs([("ItemD", "Common (100.00%)")]);
        tables.push((tier.location_for("Meso B2"), meso));
        tables.push((tier.location_for("Neo Z9"), neo));
    }
    tables
}

fn drops() -> StubDrops {
    StubDrops {
        missions: vec![
            (
                "Void/Hepit (Capture)".to_string(),
                RewardTable::from_pairs([("Lith A1 Relic", "Common (100.00%)")]),
            ),
            (
                "Sedna/Hydron (Defense) / Rotation C".to_string(),
                RewardTable::from_pairs([
                    ("Meso B2 Relic", "Rare (12.50%)"),
                    ("Endo", "Common (87.50%)"),
                ]),
            ),
        ],
        relics: relic_tables(),
    }
}

fn prices() -> PriceResolver<StubMarket> {
    // ItemD has no trade statistics
    let medians = HashMap::from([
        ("itema".to_string(), 4.0),
        ("itemb".to_string(), 40.0),
        ("itemc".to_string(), 7.0),
    ]);
    PriceResolver::new(StubMarket { medians }, default_aliases()).unwrap()
}

fn values(line: &str) -> Vec<f64> {
    line.split(' ').skip(2).map(|value| value.parse().unwrap()).collect()
}

#[test]
fn test_full_run_writes_both_reports() {
    let out_dir = TempDir::new().unwrap();
    let params = SimulationParams { num_players: 4, trials: 1024 };

    let mut run =
        ReportRun::prepare(&mut drops(), RelicSource::Missions, prices(), params).unwrap();
    assert_eq!(run.relics(), ["Lith A1".to_string(), "Meso B2".to_string()]);

    let paths = run.run(out_dir.path(), &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
    assert!(paths.weighted.starts_with(out_dir.path().join("ev_relics")));
    assert!(paths.multiplayer.starts_with(out_dir.path().join("ev_mp4_relics")));

    let weighted = fs::read_to_string(&paths.weighted).unwrap();
    assert_eq!(weighted, "Lith A1 12.00 13.80 15.80 17.60\nMeso B2 7.00 7.00 7.00 7.00\n");

    let multiplayer = fs::read_to_string(&paths.multiplayer).unwrap();
    let lines: Vec<&str> = multiplayer.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Lith A1 "));
    assert_eq!(lines[1], "Meso B2 7.00 7.00 7.00 7.00");

    // Best of four can only beat the single-roll average
    let weighted_lith = [12.0, 13.8, 15.8, 17.6];
    for (ev, weighted) in values(lines[0]).into_iter().zip(weighted_lith) {
        assert!(ev > weighted && ev <= 40.0, "best-of-four EV {ev} vs weighted {weighted}");
    }
}

#[test]
fn test_table_source_covers_every_relic_and_stops_at_first_failure() {
    let out_dir = TempDir::new().unwrap();

    let params = SimulationParams::default();
    let mut run = ReportRun::prepare(&mut drops(), RelicSource::Tables, prices(), params).unwrap();
    assert_eq!(
        run.relics(),
        ["Lith A1".to_string(), "Meso B2".to_string(), "Neo Z9".to_string()]
    );

    match run.write_weighted(out_dir.path()) {
        Err(EvError::PriceResolution { reward, .. }) => assert_eq!(reward, "ItemD"),
        other => panic!("expected PriceResolution, got {other:?}"),
    }

    // Relics finished before the failure are already on disk
    let written: Vec<_> = fs::read_dir(out_dir.path().join("ev_relics")).unwrap().collect();
    assert_eq!(written.len(), 1);
    let path = written.into_iter().next().unwrap().unwrap().path();
    let report = fs::read_to_string(path).unwrap();
    assert_eq!(report, "Lith A1 12.00 13.80 15.80 17.60\nMeso B2 7.00 7.00 7.00 7.00\n");
}

#[test]
fn test_duplicate_relic_location_aborts_the_run() {
    let mut drops = drops();
    drops.relics.push((RelicTier::Flawless.location_for("Meso B2"), RewardTable::default()));

    let params = SimulationParams::default();
    match ReportRun::prepare(&mut drops, RelicSource::Missions, prices(), params) {
        Err(EvError::DuplicateLocation(location)) => {
            assert_eq!(location, "Meso B2 Relic (Flawless)")
        }
        Err(other) => panic!("expected DuplicateLocation, got {other:?}"),
        Ok(_) => panic!("expected DuplicateLocation"),
    }
}

#[test]
fn test_duplicate_mission_location_aborts_the_run() {
    let mut drops = drops();
    drops.missions.push((
        "Void/Hepit (Capture)".to_string(),
        RewardTable::from_pairs([("Neo Z9 Relic", "Common (100.00%)")]),
    ));

    let params = SimulationParams::default();
    match ReportRun::prepare(&mut drops, RelicSource::Missions, prices(), params) {
        Err(EvError::DuplicateLocation(location)) => assert_eq!(location, "Void/Hepit (Capture)"),
        Err(other) => panic!("expected DuplicateLocation, got {other:?}"),
        Ok(_) => panic!("expected DuplicateLocation"),
    }
}

#[test]
fn test_missing_tier_is_unknown_location() {
    let mut drops = drops();
    drops.relics.retain(|(location, _)| location != "Meso B2 Relic (Radiant)");

    let params = SimulationParams::default();
    let mut run = ReportRun::prepare(&mut drops, RelicSource::Missions, prices(), params).unwrap();
    assert!(run.weighted_report("Lith A1").is_ok());
    assert!(matches!(
        run.weighted_report("Meso B2"),
        Err(EvError::UnknownLocation(location)) if location == "Meso B2 Relic (Radiant)"
    ));
}
