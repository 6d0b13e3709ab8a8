//! Tarifa Rating Engine
//!
//! Resolves which pricing rule of a profile applies at every point of a
//! usage event and compiles the event's cost:
//!
//! - [`ordering`] sweeps the rates' activation windows and emits the
//!   chronological list of winning rates
//! - [`intervals`] turns that list into charge intervals with exact
//!   decimal costs
//! - [`service`] glues both into a [`RateProfileCost`](tarifa_core::models::RateProfileCost)

pub mod intervals;
pub mod ordering;
pub mod service;

pub use intervals::compute_rate_intervals;
pub use ordering::{order_rates_on_intervals, OrderedRate};
pub use service::RateService;
