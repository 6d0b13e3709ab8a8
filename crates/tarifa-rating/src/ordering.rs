//! Interval ordering engine
//!
//! Resolves, over the whole usage period of an event, which rate applies
//! when. Every rate's activation windows are expanded, the window edges
//! become candidate switch points, and a sweep picks the highest-weight
//! active rate at each of them.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use tracing::debug;

use tarifa_core::models::{ActivationWindow, CompiledRate};
use tarifa_core::{RatingError, RatingResult};

/// One entry of the ordering result: `rate` becomes the applicable rate
/// `offset` into the event's usage.
#[derive(Debug, Clone, Copy)]
pub struct OrderedRate<'a> {
    /// Offset from the event's start time
    pub offset: Duration,
    pub rate: &'a CompiledRate,
}

/// Resolve the chronological list of applicable rates for a usage event.
///
/// `weights[i]` is the resolution weight of `rates[i]`; the highest-weight
/// rate active at an instant wins, ties going to the earlier entry. An entry
/// is emitted whenever the winning rate changes; a moment no rate covers
/// resets the comparison, so a rate resuming after a pause is emitted again.
///
/// With `is_duration` false the event is charged as a single unit and the
/// result is truncated to its first entry. No rate covering any part of the
/// period yields an empty result.
pub fn order_rates_on_intervals<'a>(
    rates: &'a [CompiledRate],
    weights: &[f64],
    start_time: DateTime<Utc>,
    usage: Duration,
    is_duration: bool,
    max_iterations: usize,
) -> RatingResult<Vec<OrderedRate<'a>>> {
    if rates.len() != weights.len() {
        return Err(RatingError::WeightsMismatch {
            rates: rates.len(),
            weights: weights.len(),
        });
    }
    let end_time = start_time + usage;

    let mut windows: Vec<Vec<ActivationWindow>> = Vec::with_capacity(rates.len());
    for rate in rates {
        windows.push(rate.run_times(start_time, end_time, max_iterations)?);
    }

    // Candidate switch points: the start itself plus every window edge
    // inside the usage period.
    let mut boundaries = BTreeSet::new();
    boundaries.insert(start_time);
    for rate_windows in &windows {
        for window in rate_windows {
            if window.start > start_time && window.start < end_time {
                boundaries.insert(window.start);
            }
            if let Some(end) = window.end {
                if end > start_time && end < end_time {
                    boundaries.insert(end);
                }
            }
        }
    }

    let mut ordered = Vec::new();
    let mut last_winner: Option<usize> = None;
    for &boundary in &boundaries {
        let mut winner: Option<usize> = None;
        for (idx, rate_windows) in windows.iter().enumerate() {
            if !rate_windows.iter().any(|w| w.covers(boundary)) {
                continue;
            }
            if winner.map_or(true, |w| weights[idx] > weights[w]) {
                winner = Some(idx);
            }
        }
        match winner {
            Some(idx) => {
                if last_winner != Some(idx) {
                    ordered.push(OrderedRate {
                        offset: boundary - start_time,
                        rate: &rates[idx],
                    });
                }
                last_winner = Some(idx);
            }
            // Nothing active here; whatever comes next is a fresh switch.
            None => last_winner = None,
        }
    }

    if !is_duration {
        ordered.truncate(1);
    }
    debug!(
        candidates = rates.len(),
        resolved = ordered.len(),
        %start_time, "ordered rates over usage period"
    );
    Ok(ordered)
}
