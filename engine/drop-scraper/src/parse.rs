//! Table parsing for the drop-table page.
//!
//! The page lays every table out the same way: a header element with a known
//! id, then a `<table>` whose rows are either a `blank-row` separator, a
//! single `<th>` header (location or rotation), or a two-cell data row
//! (item, rate label).

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::types::{MissionRewards, RelicRewards, RewardRow, RotationRewards};

/// Anchor id of the mission rewards table
pub const MISSION_REWARDS_ID: &str = "missionRewards";

/// Anchor id of the relic rewards table
pub const RELIC_REWARDS_ID: &str = "relicRewards";

/// Structural problems with the drop-table page
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Could not find header #{0}")]
    MissingHeader(String),

    #[error("Header #{0} is not followed by a table")]
    MissingTable(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Unexpected header length {0} (expected 1)")]
    HeaderLength(usize),

    #[error("Unexpected data length {0} (expected 2)")]
    DataLength(usize),

    #[error("Expected blank-row before header '{0}'")]
    ExpectedBlankRow(String),

    #[error("Data row before any location header")]
    DataBeforeHeader,
}

/// Classified table row
enum Row {
    Blank,
    Header(String),
    Data(RewardRow),
}

/// Parse the mission rewards table into locations with their rotations
pub fn parse_mission_rewards(html: &str) -> Result<Vec<MissionRewards>, ParseError> {
    let document = Html::parse_document(html);
    let table = find_table(&document, MISSION_REWARDS_ID)?;

    let mut result = Vec::new();
    let mut location: Option<String> = None;
    let mut rotations: Vec<RotationRewards> = Vec::new();
    let mut rotation: Option<String> = None;
    let mut rewards: Vec<RewardRow> = Vec::new();

    for row in table_rows(table) {
        match classify_row(row)? {
            Row::Blank => {
                close_rotation(&mut rotations, rotation.take(), &mut rewards);
                close_location(&mut result, location.take(), &mut rotations)?;
            }
            Row::Header(text) => {
                if location.is_some() {
                    close_rotation(&mut rotations, rotation.take(), &mut rewards);
                    rotation = Some(text);
                } else {
                    location = Some(text);
                }
            }
            Row::Data(reward) => rewards.push(reward),
        }
    }

    close_rotation(&mut rotations, rotation.take(), &mut rewards);
    close_location(&mut result, location.take(), &mut rotations)?;

    Ok(result)
}

/// Parse the relic rewards table into one table per relic refinement
pub fn parse_relic_rewards(html: &str) -> Result<Vec<RelicRewards>, ParseError> {
    let document = Html::parse_document(html);
    let table = find_table(&document, RELIC_REWARDS_ID)?;

    let mut result = Vec::new();
    let mut location: Option<String> = None;
    let mut rewards: Vec<RewardRow> = Vec::new();

    for row in table_rows(table) {
        match classify_row(row)? {
            Row::Blank => close_relic(&mut result, location.take(), &mut rewards)?,
            Row::Header(text) => {
                if location.is_some() {
                    return Err(ParseError::ExpectedBlankRow(text));
                }
                location = Some(text);
            }
            Row::Data(reward) => rewards.push(reward),
        }
    }

    close_relic(&mut result, location.take(), &mut rewards)?;

    Ok(result)
}

fn close_rotation(
    rotations: &mut Vec<RotationRewards>,
    rotation: Option<String>,
    rewards: &mut Vec<RewardRow>,
) {
    if !rewards.is_empty() {
        rotations.push(RotationRewards { rotation, rewards: std::mem::take(rewards) });
    }
}

fn close_location(
    result: &mut Vec<MissionRewards>,
    location: Option<String>,
    rotations: &mut Vec<RotationRewards>,
) -> Result<(), ParseError> {
    if rotations.is_empty() {
        return Ok(());
    }
    let location = location.ok_or(ParseError::DataBeforeHeader)?;
    result.push(MissionRewards { location, rotations: std::mem::take(rotations) });
    Ok(())
}

fn close_relic(
    result: &mut Vec<RelicRewards>,
    location: Option<String>,
    rewards: &mut Vec<RewardRow>,
) -> Result<(), ParseError> {
    if rewards.is_empty() {
        return Ok(());
    }
    let location = location.ok_or(ParseError::DataBeforeHeader)?;
    result.push(RelicRewards { location, rewards: std::mem::take(rewards) });
    Ok(())
}

/// Locate the anchor by id and return the first element sibling after it,
/// which must be the table
fn find_table<'a>(document: &'a Html, anchor_id: &str) -> Result<ElementRef<'a>, ParseError> {
    let selector = Selector::parse(&format!("#{anchor_id}"))
        .map_err(|e| ParseError::Selector(e.to_string()))?;
    let header = document
        .select(&selector)
        .next()
        .ok_or_else(|| ParseError::MissingHeader(anchor_id.to_string()))?;

    header
        .next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "table")
        .ok_or_else(|| ParseError::MissingTable(anchor_id.to_string()))
}

/// Direct rows of a table. The HTML parser inserts `<tbody>` wrappers, so
/// rows are collected from the table itself and from its row groups.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn classify_row(row: ElementRef<'_>) -> Result<Row, ParseError> {
    if row.value().classes().any(|class| class == "blank-row") {
        return Ok(Row::Blank);
    }

    let headers = direct_cells(row, "th");
    if !headers.is_empty() {
        if headers.len() != 1 {
            return Err(ParseError::HeaderLength(headers.len()));
        }
        return Ok(Row::Header(cell_text(headers[0])));
    }

    let columns = direct_cells(row, "td");
    if columns.len() != 2 {
        return Err(ParseError::DataLength(columns.len()));
    }
    Ok(Row::Data(RewardRow { item: cell_text(columns[0]), rate: cell_text(columns[1]) }))
}

fn direct_cells<'a>(row: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    row.children().filter_map(ElementRef::wrap).filter(|cell| cell.value().name() == name).collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
