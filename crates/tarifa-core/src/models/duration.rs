//! Serde helpers for `chrono::Duration` fields
//!
//! Durations are encoded as signed nanosecond counts on the wire, matching
//! the encoding rating peers exchange.

use chrono::Duration;

/// Nanosecond count of a duration, saturating at `i64::MAX`
pub fn nanos(d: Duration) -> i64 {
    d.num_nanoseconds().unwrap_or(i64::MAX)
}

/// Serde module for `Duration` encoded as i64 nanoseconds
pub mod duration_nanos {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(super::nanos(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::nanoseconds(i64::deserialize(deserializer)?))
    }
}

/// Serde module for `Option<Duration>` encoded as nullable i64 nanoseconds
pub mod opt_duration_nanos {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        d: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => serializer.serialize_some(&super::nanos(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<i64>::deserialize(deserializer)?.map(Duration::nanoseconds))
    }
}
