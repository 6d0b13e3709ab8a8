//! End-to-end rating flow: JSON profile in, profile cost out.

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;
use tarifa_core::models::RateProfile;
use tarifa_core::{RatingConfig, RatingError};
use tarifa_rating::RateService;

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn service() -> RateService {
    RateService::new(RatingConfig::default())
}

fn profile_from_json(json: &str) -> RateProfile {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_flat_rate_call() {
    let profile = profile_from_json(
        r#"{
            "tenant": "acme.org",
            "id": "RP_RETAIL",
            "min_cost": null,
            "max_cost": null,
            "rates": {
                "RATE1": {
                    "id": "RATE1",
                    "weight": 10.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": null,
                        "recurrent_fee": "0.02",
                        "unit": 60000000000,
                        "increment": 60000000000
                    }]
                }
            }
        }"#,
    );
    let compiled = profile.compile().unwrap();

    let cost = service()
        .profile_cost(&compiled, at("2021-01-01T10:00:00Z"), Duration::minutes(2), true)
        .unwrap();

    assert_eq!(cost.id, "RP_RETAIL");
    assert_eq!(cost.cost, dec!(0.04));
    assert_eq!(cost.intervals.len(), 1);
    assert_eq!(cost.intervals[0].increments[0].compress_factor, 2);
}

#[test]
fn test_night_surcharge_call() {
    let profile = profile_from_json(
        r#"{
            "tenant": "acme.org",
            "id": "RP_NIGHT",
            "min_cost": null,
            "max_cost": null,
            "rates": {
                "RT_ANY": {
                    "id": "RT_ANY",
                    "weight": 10.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": null,
                        "recurrent_fee": "0.01",
                        "unit": 60000000000,
                        "increment": 60000000000
                    }]
                },
                "RT_NIGHT": {
                    "id": "RT_NIGHT",
                    "activation_times": "* 22 * * *",
                    "weight": 20.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": null,
                        "recurrent_fee": "0.02",
                        "unit": 60000000000,
                        "increment": 60000000000
                    }]
                }
            }
        }"#,
    );
    let compiled = profile.compile().unwrap();

    // Call at 21:50 for 20 minutes: the night rate takes over at 22:00
    let cost = service()
        .profile_cost(&compiled, at("2021-01-01T21:50:00Z"), Duration::minutes(20), true)
        .unwrap();

    assert_eq!(cost.intervals.len(), 2);
    assert_eq!(cost.intervals[0].interval_start, Duration::zero());
    assert_eq!(cost.intervals[1].interval_start, Duration::minutes(10));
    assert_eq!(cost.cost, dec!(0.30));
    assert!(cost.rates.contains_key("RT_ANY:0"));
    assert!(cost.rates.contains_key("RT_NIGHT:0"));
}

#[test]
fn test_connection_fee_and_max_cost() {
    let profile = profile_from_json(
        r#"{
            "tenant": "acme.org",
            "id": "RP_CAPPED",
            "min_cost": null,
            "max_cost": "0.50",
            "rates": {
                "RATE1": {
                    "id": "RATE1",
                    "weight": 10.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": "0.40",
                        "recurrent_fee": "0.20",
                        "unit": 60000000000,
                        "increment": 60000000000
                    }]
                }
            }
        }"#,
    );
    let compiled = profile.compile().unwrap();

    // 0.40 fixed + 2 x 0.20 = 0.80, capped at 0.50
    let cost = service()
        .profile_cost(&compiled, at("2021-01-01T10:00:00Z"), Duration::minutes(2), true)
        .unwrap();
    assert_eq!(cost.cost, dec!(0.50));
    assert_eq!(cost.altered, vec!["*max_cost".to_string()]);
}

#[test]
fn test_zero_increment_error_propagates() {
    let profile = profile_from_json(
        r#"{
            "tenant": "acme.org",
            "id": "RP1",
            "min_cost": null,
            "max_cost": null,
            "rates": {
                "RATE1": {
                    "id": "RATE1",
                    "weight": 10.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": null,
                        "recurrent_fee": "0.01",
                        "unit": 60000000000,
                        "increment": 0
                    }]
                }
            }
        }"#,
    );
    let compiled = profile.compile().unwrap();

    let err = service()
        .profile_cost(&compiled, at("2021-01-01T10:00:00Z"), Duration::minutes(1), true)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "zero increment to be charged within rate: <acme.org:RP1:RATE1>"
    );
}

#[test]
fn test_invalid_cron_rejected_at_compile() {
    let profile = profile_from_json(
        r#"{
            "tenant": "acme.org",
            "id": "RP1",
            "min_cost": null,
            "max_cost": null,
            "rates": {
                "RATE1": {
                    "id": "RATE1",
                    "activation_times": "61 * * * *",
                    "weight": 10.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": null,
                        "recurrent_fee": "0.01",
                        "unit": 60000000000,
                        "increment": 60000000000
                    }]
                }
            }
        }"#,
    );
    assert!(matches!(
        profile.compile(),
        Err(RatingError::InvalidSchedule { .. })
    ));
}

#[test]
fn test_result_serialization_is_deterministic() {
    let profile = profile_from_json(
        r#"{
            "tenant": "acme.org",
            "id": "RP1",
            "min_cost": null,
            "max_cost": null,
            "rates": {
                "RT_B": {
                    "id": "RT_B",
                    "weight": 10.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": null,
                        "recurrent_fee": "0.01",
                        "unit": 60000000000,
                        "increment": 60000000000
                    }]
                },
                "RT_A": {
                    "id": "RT_A",
                    "activation_times": "* 22 * * *",
                    "weight": 20.0,
                    "interval_rates": [{
                        "interval_start": 0,
                        "fixed_fee": null,
                        "recurrent_fee": "0.02",
                        "unit": 60000000000,
                        "increment": 60000000000
                    }]
                }
            }
        }"#,
    );

    let run = || {
        let compiled = profile.compile().unwrap();
        let cost = service()
            .profile_cost(&compiled, at("2021-01-01T21:55:00Z"), Duration::minutes(10), true)
            .unwrap();
        serde_json::to_string(&cost).unwrap()
    };
    assert_eq!(run(), run());
}
