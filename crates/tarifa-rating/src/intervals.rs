//! Interval cost compiler
//!
//! Turns the ordering engine's output into charge intervals: for each
//! ordered rate, walks its chargeable sub-window through the rate's pricing
//! tiers and emits the increments that price it. Tier boundaries are usage
//! offsets measured from the start of the event, so a rate taking over
//! mid-call continues in whatever tier the total usage has reached.

use chrono::Duration;
use std::collections::BTreeMap;

use tarifa_core::models::duration::nanos;
use tarifa_core::models::{tier_key, IntervalRate, RateIncrement, RateInterval};
use tarifa_core::{RatingError, RatingResult};

use crate::ordering::OrderedRate;

/// Compile charge intervals for an ordered list of rates.
///
/// `compute_start` is the usage offset charging begins at (non-zero when an
/// earlier part of the event was already charged); `usage` is the amount to
/// charge from there. Every tier that prices something is recorded in
/// `used_rates` under its [`tier_key`].
pub fn compute_rate_intervals(
    ordered: &[OrderedRate<'_>],
    compute_start: Duration,
    usage: Duration,
    used_rates: &mut BTreeMap<String, IntervalRate>,
) -> RatingResult<Vec<RateInterval>> {
    let usage_end = compute_start + usage;
    let mut intervals = Vec::new();

    for (idx, ordered_rate) in ordered.iter().enumerate() {
        let sub_start = ordered_rate.offset.max(compute_start);
        let sub_end = match ordered.get(idx + 1) {
            Some(next) => next.offset.min(usage_end),
            None => usage_end,
        };
        if sub_end <= sub_start {
            continue;
        }

        let rate = ordered_rate.rate;
        let tiers = &rate.rate.interval_rates;
        let mut increments = Vec::new();
        let mut position = sub_start;
        let mut entering = true;

        while position < sub_end {
            let tier_index = tiers
                .iter()
                .rposition(|tier| tier.interval_start <= position)
                .ok_or_else(|| RatingError::IntervalStartHigherThanUsage {
                    rate: rate.uid().to_string(),
                    usage: nanos(position),
                })?;
            let tier = &tiers[tier_index];
            if tier.increment <= Duration::zero() {
                return Err(RatingError::ZeroIncrement(rate.uid().to_string()));
            }
            let key = tier_key(&rate.rate.id, tier_index);

            if entering {
                if tier.fixed_fee.is_some() {
                    increments.push(RateIncrement {
                        increment_start: position,
                        usage: None,
                        rate_key: key.clone(),
                        tier_index,
                        compress_factor: 1,
                    });
                }
                entering = false;
            }

            // The tier prices the usage up to the next tier or the end of
            // this rate's sub-window, whichever comes first.
            let upper = tiers
                .get(tier_index + 1)
                .map(|next| next.interval_start.min(sub_end))
                .unwrap_or(sub_end);
            let span = upper - position;
            let factor = (nanos(span) + nanos(tier.increment) - 1) / nanos(tier.increment);

            increments.push(RateIncrement {
                increment_start: position,
                usage: Some(span),
                rate_key: key.clone(),
                tier_index,
                compress_factor: factor,
            });
            used_rates.entry(key).or_insert_with(|| tier.clone());
            position = upper;
        }

        intervals.push(RateInterval {
            interval_start: sub_start,
            increments,
            compress_factor: 1,
        });
    }

    Ok(intervals)
}
