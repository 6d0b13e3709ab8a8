//! Domain models for the rating engine
//!
//! This module contains the rate profile model the engine computes over and
//! the charging model it produces.

pub mod cost;
pub mod duration;
pub mod rate;

pub use cost::{
    tier_key, RateIncrement, RateInterval, RateProfileCost, ALTERED_MAX_COST, ALTERED_MIN_COST,
    ALTERED_ROUNDING,
};
pub use rate::{ActivationWindow, CompiledProfile, CompiledRate, IntervalRate, Rate, RateProfile};
