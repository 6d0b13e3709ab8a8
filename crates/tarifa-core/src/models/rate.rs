//! Rate profile model
//!
//! A rate profile groups the weighted, schedule-bound pricing rules of one
//! billing subject. Profiles are declarative data; [`RateProfile::compile`]
//! turns them into the immutable compiled form the engine computes with.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::duration::duration_nanos;
use crate::error::RatingError;
use crate::schedule::{AlwaysActive, CronSchedule, Schedule};
use crate::RatingResult;

/// Pricing tier of a rate
///
/// Tiers partition the usage axis: a tier prices the usage from its
/// `interval_start` (measured from the start of the event's usage, not from
/// the rate's activation) up to the next tier's start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRate {
    /// Usage offset at which this tier begins
    #[serde(with = "duration_nanos")]
    pub interval_start: Duration,

    /// One-off fee charged when a charge interval enters this tier
    pub fixed_fee: Option<Decimal>,

    /// Fee charged per `unit` of usage (None = free)
    pub recurrent_fee: Option<Decimal>,

    /// Usage amount the recurrent fee prices
    #[serde(with = "duration_nanos")]
    pub unit: Duration,

    /// Billing granularity; partial increments are charged in full
    #[serde(with = "duration_nanos")]
    pub increment: Duration,
}

/// Pricing rule of a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rate {
    /// Rate identifier, unique within its profile
    pub id: String,

    /// 5-field cron expression bounding when the rate is active
    /// (empty = always active)
    #[serde(default)]
    pub activation_times: String,

    /// Resolution weight; the highest-weight active rate wins
    pub weight: f64,

    /// Pricing tiers, sorted ascending by `interval_start` on compile
    pub interval_rates: Vec<IntervalRate>,
}

impl Rate {
    fn compile(&self, tenant: &str, profile: &str) -> RatingResult<CompiledRate> {
        let uid = format!("{}:{}:{}", tenant, profile, self.id);
        let sched: Arc<dyn Schedule> = if self.activation_times.trim().is_empty() {
            Arc::new(AlwaysActive)
        } else {
            let cron = CronSchedule::parse(&self.activation_times).map_err(|err| {
                RatingError::InvalidSchedule {
                    rate: uid.clone(),
                    reason: err.to_string(),
                }
            })?;
            Arc::new(cron)
        };
        let mut rate = self.clone();
        rate.interval_rates.sort_by_key(|tier| tier.interval_start);
        Ok(CompiledRate { rate, uid, sched })
    }
}

/// Collection of rates belonging to one tenant/profile pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateProfile {
    pub tenant: String,
    pub id: String,

    /// Lower bound the final cost is raised to
    pub min_cost: Option<Decimal>,

    /// Upper bound the final cost is capped at
    pub max_cost: Option<Decimal>,

    pub rates: HashMap<String, Rate>,
}

impl RateProfile {
    /// Compile the profile into its immutable computable form.
    ///
    /// Sorts each rate's tiers, parses activation schedules and orders the
    /// rates by ID so computation never depends on map iteration order.
    pub fn compile(&self) -> RatingResult<CompiledProfile> {
        let mut rates = self
            .rates
            .values()
            .map(|rate| rate.compile(&self.tenant, &self.id))
            .collect::<RatingResult<Vec<_>>>()?;
        rates.sort_by(|a, b| a.rate.id.cmp(&b.rate.id));
        Ok(CompiledProfile {
            tenant: self.tenant.clone(),
            id: self.id.clone(),
            min_cost: self.min_cost,
            max_cost: self.max_cost,
            rates,
        })
    }
}

/// Compiled form of a [`RateProfile`]
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub tenant: String,
    pub id: String,
    pub min_cost: Option<Decimal>,
    pub max_cost: Option<Decimal>,

    /// Compiled rates, sorted by rate ID
    pub rates: Vec<CompiledRate>,
}

/// Contiguous period during which a rate's schedule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationWindow {
    pub start: DateTime<Utc>,

    /// First instant past the window (None = open through the computation)
    pub end: Option<DateTime<Utc>>,
}

impl ActivationWindow {
    pub fn covers(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && self.end.map_or(true, |end| t < end)
    }
}

/// Compiled form of a [`Rate`]: tiers sorted, schedule parsed, identity
/// pinned to `tenant:profile:rate`. Immutable after compilation.
#[derive(Debug, Clone)]
pub struct CompiledRate {
    pub rate: Rate,
    uid: String,
    sched: Arc<dyn Schedule>,
}

impl CompiledRate {
    /// System-wide unique identifier, `tenant:profile:rate`
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Expand the rate's activation windows over `[s_time, e_time)`.
    ///
    /// Probing starts one minute before `s_time` so a schedule matching the
    /// start's own minute is captured. A schedule producing more than
    /// `max_iterations` windows aborts with
    /// [`RatingError::MaxIterationsReached`].
    pub fn run_times(
        &self,
        s_time: DateTime<Utc>,
        e_time: DateTime<Utc>,
        max_iterations: usize,
    ) -> RatingResult<Vec<ActivationWindow>> {
        let mut windows = Vec::new();
        let mut probe = s_time - Duration::minutes(1);
        for _ in 0..max_iterations {
            let start = match self.sched.next_activation(probe) {
                Some(t) if t < e_time => t,
                _ => return Ok(windows),
            };
            match self.sched.next_inactive(start, e_time) {
                Some(end) => {
                    windows.push(ActivationWindow {
                        start,
                        end: Some(end),
                    });
                    probe = end;
                }
                None => {
                    windows.push(ActivationWindow { start, end: None });
                    return Ok(windows);
                }
            }
        }
        warn!(
            rate = %self.uid,
            max_iterations, "activation window expansion exceeded the iteration cap"
        );
        Err(RatingError::MaxIterationsReached)
    }
}
