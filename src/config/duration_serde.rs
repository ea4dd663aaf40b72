//! Serde helpers for human-readable durations in configuration files.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// Serde functions for `Duration` fields that accept either plain seconds or
/// human-readable strings such as `"1500ms"`, `"24h"`, `"1h30m"`.
pub mod duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl Visitor<'_> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as seconds (number) or human-readable string (e.g. '1500ms', '24h')",
                )
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(Duration::from_secs)
                    .map_err(|_| de::Error::custom(format!("negative duration: {seconds}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

/// Serde functions for `Option<Duration>` fields. The literal string
/// `"never"` maps to `None`, which is the only way to spell "no duration"
/// in a TOML file where the field has a non-`None` default.
pub mod option_duration {
    use super::*;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_str("never"),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OptionDurationVisitor;

        impl Visitor<'_> for OptionDurationVisitor {
            type Value = Option<Duration>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration, or \"never\" to disable")
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(Duration::from_secs(seconds)))
            }

            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(|s| Some(Duration::from_secs(s)))
                    .map_err(|_| de::Error::custom(format!("negative duration: {seconds}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value.eq_ignore_ascii_case("never") {
                    return Ok(None);
                }
                humantime::parse_duration(value)
                    .map(Some)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(OptionDurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "duration")]
        timeout: Duration,
        #[serde(with = "option_duration", default)]
        ttl: Option<Duration>,
    }

    #[test]
    fn parses_human_readable_strings() {
        let sample: Sample = toml::from_str("timeout = \"1500ms\"\nttl = \"24h\"").unwrap();
        assert_eq!(sample.timeout, Duration::from_millis(1500));
        assert_eq!(sample.ttl, Some(Duration::from_secs(86400)));
    }

    #[test]
    fn parses_plain_seconds() {
        let sample: Sample = toml::from_str("timeout = 2").unwrap();
        assert_eq!(sample.timeout, Duration::from_secs(2));
        assert_eq!(sample.ttl, None);
    }

    #[test]
    fn never_disables_an_optional_duration() {
        let sample: Sample = toml::from_str("timeout = \"1s\"\nttl = \"never\"").unwrap();
        assert_eq!(sample.ttl, None);
    }

    #[test]
    fn rejects_garbage() {
        let result: Result<Sample, _> = toml::from_str("timeout = \"soon\"");
        assert!(result.is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let sample = Sample {
            timeout: Duration::from_secs(1),
            ttl: Some(Duration::from_secs(300)),
        };
        let text = toml::to_string(&sample).unwrap();
        let parsed: Sample = toml::from_str(&text).unwrap();
        assert_eq!(parsed.timeout, sample.timeout);
        assert_eq!(parsed.ttl, sample.ttl);
    }
}
