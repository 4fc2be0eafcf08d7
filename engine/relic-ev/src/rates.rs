//! Drop-rate labels
//!
//! Drop tables print rates as free text such as `"Uncommon (25.33%)"`. The
//! first parenthesized number followed directly by `%` is the rate.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::error::{EvError, Result};

/// A drop probability in [0, 1], kept as an exact decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    pub fn from_percent(percent: Decimal) -> Self {
        Rate(percent / Decimal::ONE_HUNDRED)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

/// Parse the rate out of a label
///
/// A percentage above 100 is not a probability and fails like a missing one.
pub fn parse_rate(label: &str) -> Result<Rate> {
    percent_in(label)
        .filter(|percent| *percent <= Decimal::ONE_HUNDRED)
        .map(Rate::from_percent)
        .ok_or_else(|| EvError::RateParse { label: label.to_string() })
}

/// First `(<number>%)` in the label
fn percent_in(label: &str) -> Option<Decimal> {
    label.match_indices('(').find_map(|(open, _)| {
        let rest = &label[open + 1..];
        let close = rest.find("%)")?;
        let number = &rest[..close];
        if is_decimal_literal(number) {
            Decimal::from_str(number).ok()
        } else {
            None
        }
    })
}

/// Digits with at most one decimal point and at least one digit
fn is_decimal_literal(text: &str) -> bool {
    let mut digits = 0;
    let mut points = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

/// Per-run memo of parsed labels
#[derive(Debug, Default)]
pub struct RateCache {
    by_label: HashMap<String, Rate>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memo pre-filled with known rates, which skip parsing entirely
    pub fn with_rates(rates: impl IntoIterator<Item = (String, Rate)>) -> Self {
        Self { by_label: rates.into_iter().collect() }
    }

    /// Rate for a label, parsing it on first use
    pub fn rate(&mut self, label: &str) -> Result<Rate> {
        if let Some(rate) = self.by_label.get(label) {
            return Ok(*rate);
        }

        let rate = parse_rate(label)?;
        debug!("Parsed rate {} from '{}'", rate.as_decimal(), label);
        self.by_label.insert(label.to_string(), rate);
        Ok(rate)
    }

    /// Number of distinct labels parsed so far
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn test_parse_rate_labels() {
        assert_eq!(parse_rate("Uncommon (25.33%)").unwrap().as_decimal(), dec("0.2533"));
        assert_eq!(parse_rate("Rare (2%)").unwrap().as_decimal(), dec("0.02"));
        assert_eq!(parse_rate("(100.00%)").unwrap().as_decimal(), Decimal::ONE);
    }

    #[test]
    fn test_parse_rate_takes_first_percentage() {
        let rate = parse_rate("Very Rare (1.00%) (was 2.00%)").unwrap();
        assert_eq!(rate.as_decimal(), dec("0.01"));

        // A non-matching parenthesized group is skipped
        let rate = parse_rate("Event (Nightwave) (7.69%)").unwrap();
        assert_eq!(rate.as_decimal(), dec("0.0769"));
    }

    #[test]
    fn test_parse_rate_failures() {
        let labels = [
            "Uncommon",
            "Rare (2.00)",
            "(%)",
            "(1.2.3%)",
            "(25.33 %)",
            "25.33%",
            "(150%)",
            "Common (100.01%)",
        ];
        for label in labels {
            match parse_rate(label) {
                Err(EvError::RateParse { label: failed }) => assert_eq!(failed, label),
                other => panic!("expected RateParse for '{label}', got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rate_cache_memoizes() {
        let mut cache = RateCache::new();
        let first = cache.rate("Uncommon (11.00%)").unwrap();
        let second = cache.rate("Uncommon (11.00%)").unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        assert!(cache.rate("garbage").is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_rate_cache_seeded_labels_skip_parsing() {
        let seeded = [("Common".to_string(), Rate::from_percent(dec("76")))];
        let mut cache = RateCache::with_rates(seeded);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.rate("Common").unwrap().as_decimal(), dec("0.76"));

        // Unseeded labels still go through the parser
        assert_eq!(cache.rate("Rare (2%)").unwrap().as_decimal(), dec("0.02"));
        assert_eq!(cache.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_rate_is_percent_over_hundred(
            whole in 0u32..100,
            frac in 0u32..100,
            prefix in "[A-Za-z ]{0,12}",
        ) {
            let label = format!("{prefix}({whole}.{frac:02}%)");
            let expected = dec(&format!("{whole}.{frac:02}")) / Decimal::ONE_HUNDRED;

            let mut cache = RateCache::new();
            let first = cache.rate(&label).unwrap();
            let second = cache.rate(&label).unwrap();

            prop_assert_eq!(first, second);
            prop_assert_eq!(first.as_decimal(), expected);
            prop_assert_eq!(parse_rate(&label).unwrap(), first);
        }
    }
}
