//! Error types for the relic EV engine

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for relic EV operations
pub type Result<T> = std::result::Result<T, EvError>;

/// Errors that abort a report run
#[derive(Error, Debug)]
pub enum EvError {
    #[error("Could not parse rate from label '{label}'")]
    RateParse { label: String },

    #[error("Could not resolve price for '{reward}': {reason}")]
    PriceResolution { reward: String, reason: PriceFailure },

    #[error("Bad total rate {total_rate} for {location} (must exceed 0.5)")]
    InvariantViolation { location: String, total_rate: Decimal },

    #[error("Duplicate location {0}")]
    DuplicateLocation(String),

    #[error("Unknown location {0}")]
    UnknownLocation(String),

    #[error("No simulated trial kept a reward for {location}")]
    NoKeptTrials { location: String },

    #[error("Invalid relic argument '{0}'")]
    InvalidRelicArg(String),

    #[error("Provider error: {0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a reward could not be priced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceFailure {
    #[error("no catalog entry after alias and blueprint fallback")]
    NotInCatalog,

    #[error("catalog entry {slug} has no trade statistics")]
    UnknownPrice { slug: String },

    #[error("unexpected statistics timestamp '{datetime}'")]
    BadTimestamp { datetime: String },

    #[error("statistics lookup failed: {0}")]
    Lookup(String),
}

impl EvError {
    /// Create a new price resolution error
    pub fn price(reward: impl Into<String>, reason: PriceFailure) -> Self {
        Self::PriceResolution { reward: reward.into(), reason }
    }
}
