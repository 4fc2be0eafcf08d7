//! Per-relic drop inspection
//!
//! Lists every reward of a relic's Intact table with its rate and price, for
//! eyeballing what a relic is worth opening.

use crate::error::{EvError, Result};
use crate::pricing::PriceProvider;
use crate::rates::RateCache;
use crate::tables::{RelicIndex, RelicTier};

/// One reward of an inspected relic
#[derive(Debug, Clone, PartialEq)]
pub struct InspectRow {
    pub location: String,
    pub item: String,
    pub rate_label: String,
    /// `None` for rewards that are never priced
    pub price: Option<f64>,
}

/// Row ordering of an inspection table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowOrder {
    /// Rate ascending, then label, then price descending
    #[default]
    Rate,
    /// Reward name
    Name,
    /// Price descending
    Price,
}

/// Expand shorthand relic arguments into relic names
///
/// An argument whose second character is a letter starts with an era letter
/// (`L`, `M`, `N` or `A`); later arguments without one reuse that era, so
/// `["LA1", "B2", "MC3"]` names Lith A1, Lith B2 and Meso C3.
pub fn parse_relic_args<S: AsRef<str>>(args: &[S]) -> Result<Vec<String>> {
    let mut era: Option<&'static str> = None;
    let mut relics = Vec::with_capacity(args.len());

    for arg in args {
        let arg = arg.as_ref().to_uppercase();
        let invalid = || EvError::InvalidRelicArg(arg.clone());

        let mut chars = arg.chars();
        let (first, second) = match (chars.next(), chars.next()) {
            (Some(first), Some(second)) => (first, second),
            _ => return Err(invalid()),
        };

        let name = if second.is_ascii_alphabetic() {
            era = Some(match first {
                'L' => "Lith",
                'M' => "Meso",
                'N' => "Neo",
                'A' => "Axi",
                _ => return Err(invalid()),
            });
            &arg[first.len_utf8()..]
        } else {
            arg.as_str()
        };

        let current = era.ok_or_else(invalid)?;
        relics.push(format!("{current} {name}"));
    }

    Ok(relics)
}

/// Rows for the Intact table of each relic
pub fn inspect_relics<P: PriceProvider>(
    index: &RelicIndex,
    relics: &[String],
    prices: &mut P,
    rates: &mut RateCache,
    order: RowOrder,
) -> Result<Vec<InspectRow>> {
    let mut rows = Vec::new();

    for relic in relics {
        let location = RelicTier::Intact.location_for(relic);
        for entry in index.get(&location)?.entries() {
            let price = if entry.is_included() {
                Some(prices.resolve_price(&entry.item)?)
            } else {
                None
            };
            rows.push(InspectRow {
                location: location.clone(),
                item: entry.item.clone(),
                rate_label: entry.rate_label.clone(),
                price,
            });
        }
    }

    match order {
        RowOrder::Name => rows.sort_by(|a, b| a.item.cmp(&b.item)),
        RowOrder::Price => rows.sort_by(|a, b| sort_price(b).total_cmp(&sort_price(a))),
        RowOrder::Rate => {
            let mut keyed = Vec::with_capacity(rows.len());
            for row in rows {
                keyed.push((rates.rate(&row.rate_label)?, row));
            }
            keyed.sort_by(|(rate_a, a), (rate_b, b)| {
                rate_a
                    .cmp(rate_b)
                    .then_with(|| a.rate_label.cmp(&b.rate_label))
                    .then_with(|| sort_price(b).total_cmp(&sort_price(a)))
            });
            rows = keyed.into_iter().map(|(_, row)| row).collect();
        }
    }

    Ok(rows)
}

/// Unpriced rewards sort as the cheapest
fn sort_price(row: &InspectRow) -> f64 {
    row.price.unwrap_or(-1.0)
}

/// Render rows as an aligned plain-text table
pub fn render_table(rows: &[InspectRow]) -> String {
    let headers = ["Location", "Drop", "Rate", "Price"];
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.location.clone(),
                row.item.clone(),
                row.rate_label.clone(),
                row.price.map_or_else(|| "-".to_string(), |price| price.to_string()),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().zip(widths).map(|(h, w)| format!("{h:<w$}")).collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(column, (cell, w))| {
                if column == 3 {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}
