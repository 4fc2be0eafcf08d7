//! Expected-value math over a single reward table

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EvError, Result};
use crate::pricing::PriceProvider;
use crate::rates::RateCache;
use crate::tables::RewardTable;

/// Monte Carlo parameters for best-of-N EV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Rolls per trial, one per player in the squad
    pub num_players: u32,
    pub trials: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self { num_players: 4, trials: 4096 }
    }
}

/// EV calculator owning the per-run rate memo and a price provider
pub struct EvEngine<P: PriceProvider> {
    rates: RateCache,
    prices: P,
}

impl<P: PriceProvider> EvEngine<P> {
    pub fn new(prices: P) -> Self {
        Self::with_rates(RateCache::new(), prices)
    }

    /// Engine with a pre-seeded rate memo
    pub fn with_rates(rates: RateCache, prices: P) -> Self {
        Self { rates, prices }
    }

    pub fn prices(&mut self) -> &mut P {
        &mut self.prices
    }

    /// Probability-weighted average price over the included entries
    ///
    /// The rate total is checked before any entry is priced.
    pub fn weighted_ev(&mut self, location: &str, table: &RewardTable) -> Result<f64> {
        let mut rates = Vec::with_capacity(table.len());
        let mut total_rate = Decimal::ZERO;

        for entry in table.included() {
            let rate = self.rates.rate(&entry.rate_label)?;
            total_rate += rate.as_decimal();
            rates.push((entry.item.as_str(), rate));
        }

        // Included rates must cover more than half of the table
        if total_rate <= Decimal::new(5, 1) {
            return Err(EvError::InvariantViolation {
                location: location.to_string(),
                total_rate,
            });
        }

        let mut ev = 0.0;
        for (item, rate) in rates {
            ev += self.prices.resolve_price(item)? * rate.as_f64();
        }

        debug!("Weighted EV of {} is {:.4} (total rate {})", location, ev, total_rate);
        Ok(ev)
    }

    /// Average of the best price across `num_players` independent rolls
    ///
    /// A roll lands on the first included entry whose cumulative rate exceeds
    /// it. Rolls past the cumulative total land nowhere, and a trial where no
    /// roll landed is left out of the average.
    pub fn multiplayer_ev<R: Rng + ?Sized>(
        &mut self,
        location: &str,
        table: &RewardTable,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<f64> {
        let thresholds = self.cumulative_thresholds(table)?;

        let mut total_value = 0.0;
        let mut kept_trials: u64 = 0;

        for _ in 0..params.trials {
            let mut best_price: Option<f64> = None;

            for _ in 0..params.num_players {
                let roll: f64 = rng.gen();
                let landed = thresholds.iter().find(|(threshold, _)| *threshold > roll);
                let Some((_, item)) = landed else {
                    continue;
                };

                let price = self.prices.resolve_price(item)?;
                best_price = Some(best_price.map_or(price, |best| best.max(price)));
            }

            if let Some(price) = best_price {
                total_value += price;
                kept_trials += 1;
            }
        }

        if kept_trials == 0 {
            return Err(EvError::NoKeptTrials { location: location.to_string() });
        }

        let ev = total_value / kept_trials as f64;
        debug!(
            "Multiplayer EV of {} is {:.4} ({}/{} trials kept)",
            location, ev, kept_trials, params.trials
        );
        Ok(ev)
    }

    /// Cumulative rate after each included entry, summed exactly
    fn cumulative_thresholds<'t>(
        &mut self,
        table: &'t RewardTable,
    ) -> Result<Vec<(f64, &'t str)>> {
        let mut cumulative = Decimal::ZERO;
        let mut thresholds = Vec::with_capacity(table.len());

        for entry in table.included() {
            cumulative += self.rates.rate(&entry.rate_label)?.as_decimal();
            thresholds.push((cumulative.to_f64().unwrap_or(f64::MAX), entry.item.as_str()));
        }

        Ok(thresholds)
    }
}
