//! Timestamp type and the date formats accepted in structure payloads.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// UTC timestamp used for effective dates.
pub type Timestamp = DateTime<Utc>;

/// Compact form emitted by older servers, e.g. `2017-01-10T0000`.
const COMPACT_FORMAT: &str = "%Y-%m-%dT%H%M";
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an RFC 3339 timestamp, falling back to the compact and naive forms
/// (both interpreted as UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.to_utc());
    }
    NaiveDateTime::parse_from_str(raw, COMPACT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serde adapter for `Option<Timestamp>` fields.
///
/// Writes RFC 3339 with second precision, reads anything
/// [`parse_timestamp`] understands.
pub mod optional {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{SecondsFormat, Timestamp, parse_timestamp};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|raw| {
            parse_timestamp(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn should_parse_rfc3339_timestamp() {
        let ts = parse_timestamp("2019-03-25T10:15:00+03:00").unwrap();
        assert_eq!(ts.hour(), 7);
        assert_eq!(ts.minute(), 15);
    }

    #[test]
    fn should_parse_compact_timestamp_as_utc() {
        let ts = parse_timestamp("2017-01-10T0000").unwrap();
        assert_eq!(ts.year(), 2017);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 10);
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn should_parse_naive_timestamp_as_utc() {
        let ts = parse_timestamp("2018-11-26T08:30:00").unwrap();
        assert_eq!(ts.hour(), 8);
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn should_reject_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
