//! Rate activation schedules
//!
//! A rate is active during the minutes its cron expression matches. The
//! engine only sees the [`Schedule`] trait: `next_activation` finds the next
//! matching minute strictly after a probe instant, `next_inactive` finds the
//! first non-matching minute at or after an activation instant.
//!
//! Schedules work at minute granularity, the resolution of a 5-field cron
//! expression.

use chrono::{DateTime, Duration, TimeZone, Utc};
use croner::errors::CronError;
use croner::Cron;
use std::fmt;

/// Activation schedule of a rate
pub trait Schedule: fmt::Debug + Send + Sync {
    /// Next instant strictly after `after` at which the schedule matches.
    fn next_activation(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;

    /// First instant at or after `from` at which the schedule no longer
    /// matches, bounded by `horizon`. `None` means the schedule stays
    /// active through the horizon.
    fn next_inactive(&self, from: DateTime<Utc>, horizon: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// Floor an instant to its minute boundary
fn minute_floor(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp().div_euclid(60) * 60;
    Utc.timestamp_opt(secs, 0).single().unwrap_or(t)
}

/// Schedule of a rate with no activation expression: active at all times.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysActive;

impl Schedule for AlwaysActive {
    fn next_activation(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = (after.timestamp().div_euclid(60) + 1) * 60;
        Utc.timestamp_opt(secs, 0).single()
    }

    fn next_inactive(&self, _from: DateTime<Utc>, _horizon: DateTime<Utc>) -> Option<DateTime<Utc>> {
        None
    }
}

/// Cron-driven schedule
#[derive(Debug, Clone)]
pub struct CronSchedule {
    cron: Cron,
}

impl CronSchedule {
    /// Parse a 5-field cron expression (a seconds field is accepted too)
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let cron = Cron::new(expr).with_seconds_optional().parse()?;
        Ok(Self { cron })
    }
}

impl Schedule for CronSchedule {
    fn next_activation(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron.find_next_occurrence(&after, false).ok()
    }

    fn next_inactive(&self, from: DateTime<Utc>, horizon: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut probe = minute_floor(from);
        while probe < horizon {
            if !self.cron.is_time_matching(&probe).unwrap_or(false) {
                return Some(probe);
            }
            probe += Duration::minutes(1);
        }
        None
    }
}
