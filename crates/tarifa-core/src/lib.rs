//! Tarifa Core Library
//!
//! This crate provides the foundational types for the Tarifa rating engine:
//!
//! - Domain models (rate profiles, interval rates, charge increments)
//! - Activation schedule evaluation (cron-based and always-on)
//! - Unified error handling
//! - Engine configuration

pub mod config;
pub mod error;
pub mod models;
pub mod schedule;

pub use config::RatingConfig;
pub use error::RatingError;

/// Result type alias using RatingError
pub type RatingResult<T> = Result<T, RatingError>;
