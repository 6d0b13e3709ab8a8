//! Unified error handling for the rating engine
//!
//! Every failure the engine can produce is a variant of [`RatingError`].
//! All errors are fatal for the computation that raised them; the engine
//! never returns partial results.

use thiserror::Error;

/// Main rating engine error type
#[derive(Error, Debug)]
pub enum RatingError {
    // ==================== Ordering Errors ====================
    #[error("maximum iterations reached")]
    MaxIterationsReached,

    #[error("rates and weights length mismatch: {rates} rates, {weights} weights")]
    WeightsMismatch { rates: usize, weights: usize },

    // ==================== Cost Compilation Errors ====================
    #[error("zero increment to be charged within rate: <{0}>")]
    ZeroIncrement(String),

    #[error("intervalStart for rate: <{rate}> higher than usage: {usage}")]
    IntervalStartHigherThanUsage { rate: String, usage: i64 },

    #[error("no interval rate found for key: <{0}>")]
    UnknownTier(String),

    // ==================== Profile Errors ====================
    #[error("invalid activation schedule for rate: <{rate}>: {reason}")]
    InvalidSchedule { rate: String, reason: String },

    // ==================== Internal Errors ====================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ==================== From implementations ====================

impl From<config::ConfigError> for RatingError {
    fn from(err: config::ConfigError) -> Self {
        RatingError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RatingError {
    fn from(err: serde_json::Error) -> Self {
        RatingError::Serialization(err.to_string())
    }
}
