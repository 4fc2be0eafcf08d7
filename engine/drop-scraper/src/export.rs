//! On-disk snapshots and CSV exports of scraped tables

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::{DropSnapshot, MissionRewards, RelicRewards};

/// Load a JSON snapshot if it exists
pub fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<DropSnapshot<T>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    Ok(Some(snapshot))
}

/// Save a JSON snapshot, creating the parent directory if needed
pub fn save_snapshot<T: Serialize>(path: &Path, snapshot: &DropSnapshot<T>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write `Location,Rotation,Item,Rate` rows for every mission reward
pub fn write_missions_csv(path: &Path, missions: &[MissionRewards]) -> Result<()> {
    let mut writer = create_csv(path)?;
    write_record(&mut writer, &["Location", "Rotation", "Item", "Rate"])?;
    for mission in missions {
        for rotation in &mission.rotations {
            let rotation_name = rotation.rotation.as_deref().unwrap_or("");
            for reward in &rotation.rewards {
                write_record(
                    &mut writer,
                    &[&mission.location, rotation_name, &reward.item, &reward.rate],
                )?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write `Location,Item,Rate` rows for every relic reward
pub fn write_relics_csv(path: &Path, relics: &[RelicRewards]) -> Result<()> {
    let mut writer = create_csv(path)?;
    write_record(&mut writer, &["Location", "Item", "Rate"])?;
    for relic in relics {
        for reward in &relic.rewards {
            write_record(&mut writer, &[&relic.location, &reward.item, &reward.rate])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn create_csv(path: &Path) -> Result<BufWriter<fs::File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file =
        fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_record<W: Write>(writer: &mut W, fields: &[&str]) -> Result<()> {
    let line = fields.iter().map(|field| quote_field(field)).collect::<Vec<_>>().join(",");
    writeln!(writer, "{line}")?;
    Ok(())
}

/// Quote a field when it contains a separator, quote, or line break
fn quote_field(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
