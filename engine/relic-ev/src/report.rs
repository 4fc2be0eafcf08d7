//! Report driver
//!
//! Computes EV for every relic across the four refinement tiers and writes
//! one line per relic to a timestamped report file. Lines are flushed as they
//! are produced, so a failure part way through leaves every finished relic on
//! disk.

use chrono::{Local, NaiveDateTime};
use rand::Rng;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::RelicSource;
use crate::error::Result;
use crate::ev::{EvEngine, SimulationParams};
use crate::pricing::PriceProvider;
use crate::providers::DropTableProvider;
use crate::tables::{
    check_unique_locations, relics_from_missions, RelicIndex, RelicTier, TableKind,
};

/// Report file name format (local time, second precision)
pub const REPORT_FILE_FORMAT: &str = "%Y-%m-%dT%H.%M.%S.txt";

/// Which EV a report holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Probability-weighted average
    Weighted,
    /// Monte Carlo best-of-squad
    Multiplayer,
}

impl ReportKind {
    /// Subdirectory of the output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            ReportKind::Weighted => "ev_relics",
            ReportKind::Multiplayer => "ev_mp4_relics",
        }
    }

    /// Report path for a run started at `time`
    pub fn report_path(&self, out_dir: &Path, time: NaiveDateTime) -> PathBuf {
        out_dir.join(self.dir_name()).join(time.format(REPORT_FILE_FORMAT).to_string())
    }
}

/// EV of one relic in tier order Intact, Exceptional, Flawless, Radiant
#[derive(Debug, Clone, PartialEq)]
pub struct EvReport {
    pub relic: String,
    pub ev_by_tier: [f64; 4],
}

impl fmt::Display for EvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [intact, exceptional, flawless, radiant] = self.ev_by_tier;
        write!(f, "{} {:.2} {:.2} {:.2} {:.2}", self.relic, intact, exceptional, flawless, radiant)
    }
}

/// Files written by a full run
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub weighted: PathBuf,
    pub multiplayer: PathBuf,
}

/// One report invocation: tables, relic list, and the EV engine with its memos
pub struct ReportRun<P: PriceProvider> {
    engine: EvEngine<P>,
    index: RelicIndex,
    relics: Vec<String>,
    params: SimulationParams,
}

impl<P: PriceProvider> ReportRun<P> {
    pub fn new(
        engine: EvEngine<P>,
        index: RelicIndex,
        relics: Vec<String>,
        params: SimulationParams,
    ) -> Self {
        Self { engine, index, relics, params }
    }

    /// Load relic tables and the relic list from a drop-table provider
    pub fn prepare<D: DropTableProvider>(
        drops: &mut D,
        source: RelicSource,
        prices: P,
        params: SimulationParams,
    ) -> Result<Self> {
        let index = RelicIndex::from_tables(drops.reward_tables(TableKind::Relics)?)?;

        let relics = match source {
            RelicSource::Missions => {
                let missions = drops.reward_tables(TableKind::Missions)?;
                check_unique_locations(&missions)?;
                relics_from_missions(&missions)
            }
            RelicSource::Tables => index.relic_names(),
        };
        info!("Reporting on {} relics from {} relic tables", relics.len(), index.len());

        Ok(Self::new(EvEngine::new(prices), index, relics, params))
    }

    pub fn relics(&self) -> &[String] {
        &self.relics
    }

    /// Weighted EV of every tier of one relic
    pub fn weighted_report(&mut self, relic: &str) -> Result<EvReport> {
        let mut ev_by_tier = [0.0; 4];
        for (ev, tier) in ev_by_tier.iter_mut().zip(RelicTier::ALL) {
            let location = tier.location_for(relic);
            *ev = self.engine.weighted_ev(&location, self.index.get(&location)?)?;
        }
        Ok(EvReport { relic: relic.to_string(), ev_by_tier })
    }

    /// Best-of-squad EV of every tier of one relic
    pub fn multiplayer_report<R: Rng + ?Sized>(
        &mut self,
        relic: &str,
        rng: &mut R,
    ) -> Result<EvReport> {
        let mut ev_by_tier = [0.0; 4];
        for (ev, tier) in ev_by_tier.iter_mut().zip(RelicTier::ALL) {
            let location = tier.location_for(relic);
            let table = self.index.get(&location)?;
            *ev = self.engine.multiplayer_ev(&location, table, &self.params, rng)?;
        }
        Ok(EvReport { relic: relic.to_string(), ev_by_tier })
    }

    /// Write the weighted report under `out_dir`
    pub fn write_weighted(&mut self, out_dir: &Path) -> Result<PathBuf> {
        let path = ReportKind::Weighted.report_path(out_dir, Local::now().naive_local());
        let mut writer = create_report(&path)?;

        for relic in self.relics.clone() {
            let report = self.weighted_report(&relic)?;
            write_line(&mut writer, &report)?;
        }

        info!("Wrote weighted EV report to {}", path.display());
        Ok(path)
    }

    /// Write the multiplayer report under `out_dir`
    pub fn write_multiplayer<R: Rng + ?Sized>(
        &mut self,
        out_dir: &Path,
        rng: &mut R,
    ) -> Result<PathBuf> {
        let path = ReportKind::Multiplayer.report_path(out_dir, Local::now().naive_local());
        let mut writer = create_report(&path)?;

        for relic in self.relics.clone() {
            let report = self.multiplayer_report(&relic, rng)?;
            write_line(&mut writer, &report)?;
        }

        info!("Wrote multiplayer EV report to {}", path.display());
        Ok(path)
    }

    /// Write both reports
    pub fn run<R: Rng + ?Sized>(&mut self, out_dir: &Path, rng: &mut R) -> Result<ReportPaths> {
        let weighted = self.write_weighted(out_dir)?;
        let multiplayer = self.write_multiplayer(out_dir, rng)?;
        Ok(ReportPaths { weighted, multiplayer })
    }
}

/// Create a report file; an existing file is never overwritten
fn create_report(path: &Path) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(BufWriter::new(file))
}

fn write_line(writer: &mut impl Write, report: &EvReport) -> Result<()> {
    writeln!(writer, "{report}")?;
    writer.flush()?;
    info!("{}", report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_report_line_format() {
        let report =
            EvReport { relic: "Lith A1".to_string(), ev_by_tier: [14.0, 6.0, 0.0, 123.456] };
        assert_eq!(report.to_string(), "Lith A1 14.00 6.00 0.00 123.46");
    }

    #[test]
    fn test_report_paths() {
        let time = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(13, 4, 5).unwrap();
        let out = Path::new("out");

        assert_eq!(
            ReportKind::Weighted.report_path(out, time),
            PathBuf::from("out/ev_relics/2024-05-01T13.04.05.txt")
        );
        assert_eq!(
            ReportKind::Multiplayer.report_path(out, time),
            PathBuf::from("out/ev_mp4_relics/2024-05-01T13.04.05.txt")
        );
    }

    #[test]
    fn test_create_report_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ev_relics").join("2024-05-01T13.04.05.txt");

        let mut writer = create_report(&path).unwrap();
        let report = EvReport { relic: "Lith A1".to_string(), ev_by_tier: [1.0; 4] };
        write_line(&mut writer, &report).unwrap();
        drop(writer);

        assert!(create_report(&path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "Lith A1 1.00 1.00 1.00 1.00\n");
    }
}
