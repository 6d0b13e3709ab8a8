//! Rate service implementation
//!
//! Glues the ordering engine and the cost compiler into the one call most
//! consumers want: event in, `RateProfileCost` out.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use tarifa_core::models::{CompiledProfile, RateInterval, RateProfileCost};
use tarifa_core::{RatingConfig, RatingResult};

use crate::intervals::compute_rate_intervals;
use crate::ordering::order_rates_on_intervals;

/// Profile cost computation service
pub struct RateService {
    config: RatingConfig,
}

impl RateService {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    /// Compute the cost of a usage event against a compiled profile.
    ///
    /// Orders the profile's rates over the usage period, compiles the charge
    /// intervals, compresses repeating intervals, sums the total and applies
    /// the profile's cost correction. An event no rate covers yields a
    /// zero-cost result with no intervals.
    #[instrument(skip(self, profile), fields(profile = %profile.id))]
    pub fn profile_cost(
        &self,
        profile: &CompiledProfile,
        start_time: DateTime<Utc>,
        usage: Duration,
        is_duration: bool,
    ) -> RatingResult<RateProfileCost> {
        let weights: Vec<f64> = profile.rates.iter().map(|r| r.rate.weight).collect();
        let ordered = order_rates_on_intervals(
            &profile.rates,
            &weights,
            start_time,
            usage,
            is_duration,
            self.config.max_iterations,
        )?;
        if ordered.is_empty() {
            debug!("no rate covers the usage period");
            return Ok(RateProfileCost {
                id: profile.id.clone(),
                cost: Decimal::ZERO,
                min_cost: profile.min_cost,
                max_cost: profile.max_cost,
                intervals: Vec::new(),
                rates: BTreeMap::new(),
                altered: Vec::new(),
            });
        }

        let mut used_rates = BTreeMap::new();
        let intervals =
            compute_rate_intervals(&ordered, Duration::zero(), usage, &mut used_rates)?;
        let intervals = compress_intervals(intervals);

        let mut cost = Decimal::ZERO;
        for interval in &intervals {
            cost += interval.cost(&used_rates)?;
        }

        let mut profile_cost = RateProfileCost {
            id: profile.id.clone(),
            cost,
            min_cost: profile.min_cost,
            max_cost: profile.max_cost,
            intervals,
            rates: used_rates,
            altered: Vec::new(),
        };
        profile_cost.correct_cost(self.config.rounding_decimals);
        debug!(cost = %profile_cost.cost, altered = ?profile_cost.altered, "profile cost computed");
        Ok(profile_cost)
    }
}

/// Merge consecutive structurally identical intervals into one entry with a
/// bumped compress factor.
fn compress_intervals(intervals: Vec<RateInterval>) -> Vec<RateInterval> {
    let mut compressed: Vec<RateInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match compressed.last_mut() {
            Some(last) if last.compress_equals(&interval) => {
                last.compress_factor += interval.compress_factor;
            }
            _ => compressed.push(interval),
        }
    }
    compressed
}
