//! Charging model
//!
//! The cost compiler emits [`RateInterval`]s made of [`RateIncrement`]s;
//! together with the map of used tiers they are enough to reproduce every
//! charged amount. [`RateProfileCost`] is the final, serializable answer.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::duration::{duration_nanos, nanos, opt_duration_nanos};
use super::rate::IntervalRate;
use crate::error::RatingError;
use crate::RatingResult;

/// Marker recorded in `altered` when the cost was raised to the minimum
pub const ALTERED_MIN_COST: &str = "*min_cost";
/// Marker recorded in `altered` when the cost was capped at the maximum
pub const ALTERED_MAX_COST: &str = "*max_cost";
/// Marker recorded in `altered` when rounding changed the cost
pub const ALTERED_ROUNDING: &str = "*rounding";

/// Key a tier is filed under in the used-tier map.
///
/// Stable across runs, unlike randomly generated keys, so two computations
/// over the same inputs serialize identically.
pub fn tier_key(rate_id: &str, tier_index: usize) -> String {
    format!("{}:{}", rate_id, tier_index)
}

/// One charged slice of usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateIncrement {
    /// Usage offset where the increment starts
    #[serde(with = "duration_nanos")]
    pub increment_start: Duration,

    /// Usage charged; `None` marks a fixed-fee increment
    #[serde(with = "opt_duration_nanos")]
    pub usage: Option<Duration>,

    /// Key of the priced tier in the used-tier map
    pub rate_key: String,

    /// Index of the priced tier within its rate
    pub tier_index: usize,

    /// Number of billing increments this entry stands for
    pub compress_factor: i64,
}

impl RateIncrement {
    /// Cost of this increment under `tier`
    pub fn cost(&self, tier: &IntervalRate) -> Decimal {
        match self.usage {
            None => tier.fixed_fee.unwrap_or(Decimal::ZERO),
            Some(_) => {
                let fee = tier.recurrent_fee.unwrap_or(Decimal::ZERO);
                let factor = Decimal::from(self.compress_factor);
                if tier.unit == tier.increment {
                    fee * factor
                } else {
                    // Single division keeps terminating decimals exact
                    fee * Decimal::from(nanos(tier.increment)) * factor
                        / Decimal::from(nanos(tier.unit))
                }
            }
        }
    }

    /// Structural equality used for interval compression: everything but
    /// the start offset.
    pub fn compress_equals(&self, other: &Self) -> bool {
        self.usage == other.usage
            && self.rate_key == other.rate_key
            && self.tier_index == other.tier_index
            && self.compress_factor == other.compress_factor
    }
}

/// Contiguous run of increments charged under one rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateInterval {
    /// Usage offset where the interval starts
    #[serde(with = "duration_nanos")]
    pub interval_start: Duration,

    pub increments: Vec<RateIncrement>,

    /// Number of structurally identical consecutive intervals this entry
    /// stands for
    pub compress_factor: i64,
}

impl RateInterval {
    /// Cost of the interval, resolving tiers through `rates`
    pub fn cost(&self, rates: &BTreeMap<String, IntervalRate>) -> RatingResult<Decimal> {
        let mut total = Decimal::ZERO;
        for increment in &self.increments {
            let tier = rates
                .get(&increment.rate_key)
                .ok_or_else(|| RatingError::UnknownTier(increment.rate_key.clone()))?;
            total += increment.cost(tier);
        }
        Ok(total * Decimal::from(self.compress_factor))
    }

    pub fn compress_equals(&self, other: &Self) -> bool {
        self.increments.len() == other.increments.len()
            && self
                .increments
                .iter()
                .zip(&other.increments)
                .all(|(a, b)| a.compress_equals(b))
    }
}

/// Final cost of a usage event against one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateProfileCost {
    /// Profile identifier
    pub id: String,

    pub cost: Decimal,
    pub min_cost: Option<Decimal>,
    pub max_cost: Option<Decimal>,

    pub intervals: Vec<RateInterval>,

    /// Tiers the computation actually used, keyed by [`tier_key`]
    pub rates: BTreeMap<String, IntervalRate>,

    /// Corrections applied after summation, in application order
    pub altered: Vec<String>,
}

impl RateProfileCost {
    /// Clamp the cost to the profile bounds and round it.
    ///
    /// Applied corrections are recorded in `altered`; rounding uses banker's
    /// rounding at `decimals` places.
    pub fn correct_cost(&mut self, decimals: u32) {
        if let Some(min) = self.min_cost {
            if self.cost < min {
                self.cost = min;
                self.altered.push(ALTERED_MIN_COST.to_string());
            }
        }
        if let Some(max) = self.max_cost {
            if self.cost > max {
                self.cost = max;
                self.altered.push(ALTERED_MAX_COST.to_string());
            }
        }
        let rounded = self.cost.round_dp(decimals);
        if rounded != self.cost {
            self.cost = rounded;
            self.altered.push(ALTERED_ROUNDING.to_string());
        }
    }
}
