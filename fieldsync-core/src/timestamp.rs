//! ISO-8601 timestamp handling.
//!
//! The backend stores dates as extended ISO-8601 strings in UTC with
//! millisecond precision (`2024-03-01T08:30:00.000Z`). Models use the
//! [`iso8601`] and [`iso8601_option`] serde adapters so both directions use
//! the same fixed format.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::CoreError;

/// Formats a timestamp in the backend's fixed format.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 extended timestamp, normalizing to UTC.
pub fn parse(value: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidTimestamp(format!("{value}: {e}")))
}

/// Serde adapter for required timestamps.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a timestamp in the fixed backend format.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format(value))
    }

    /// Deserializes an ISO-8601 extended timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional timestamps.
///
/// Pair with `#[serde(default)]` so a missing key decodes to `None`.
pub mod iso8601_option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes an optional timestamp.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&super::format(v)),
            None => s.serialize_none(),
        }
    }

    /// Deserializes an optional timestamp; `null` becomes `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => super::parse(&raw).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
