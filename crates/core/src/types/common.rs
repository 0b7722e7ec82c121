//! Common types and utilities shared across domain models

use crate::error::AppError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp in milliseconds since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp for the current moment
    ///
    /// If system time is somehow before UNIX_EPOCH, falls back to timestamp 0
    /// instead of panicking.
    pub fn now() -> Self {
        Self(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_else(|_| std::time::Duration::from_secs(0))
                .as_millis() as i64,
        )
    }

    /// Creates a timestamp from milliseconds since Unix epoch
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as milliseconds since Unix epoch
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Formats the timestamp as an ISO-8601 UTC string with millisecond precision
    ///
    /// The output has the shape `2024-01-01T12:00:00.000Z`.
    pub fn to_iso8601(&self) -> Result<String, AppError> {
        DateTime::<Utc>::from_timestamp_millis(self.0)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .ok_or_else(|| AppError::InvalidTimestamp {
                value: self.0.to_string(),
                reason: "outside the representable date range".to_string(),
            })
    }

    /// Parses an ISO-8601 / RFC 3339 string
    ///
    /// Any UTC offset is accepted; sub-millisecond digits are dropped.
    pub fn parse_iso8601(value: &str) -> Result<Self, AppError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| Self(dt.timestamp_millis()))
            .map_err(|e| AppError::InvalidTimestamp {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now() {
        let t1 = Timestamp::now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let t2 = Timestamp::now();
        assert!(t2 > t1);
    }

    #[test]
    fn test_timestamp_from_millis() {
        let t = Timestamp::from_millis(1234567890123);
        assert_eq!(t.as_millis(), 1234567890123);
    }

    #[test]
    fn test_timestamp_display() {
        let t = Timestamp::from_millis(1234567890123);
        assert_eq!(t.to_string(), "1234567890123");
    }

    #[test]
    fn test_iso8601_format_has_millis() {
        let t = Timestamp::from_millis(1_704_110_400_007);
        assert_eq!(t.to_iso8601().unwrap(), "2024-01-01T12:00:00.007Z");
    }

    #[test]
    fn test_iso8601_epoch() {
        let t = Timestamp::from_millis(0);
        assert_eq!(t.to_iso8601().unwrap(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_iso8601_parse_roundtrip_preserves_millis() {
        let t = Timestamp::from_millis(1_719_000_123_456);
        let s = t.to_iso8601().unwrap();
        assert_eq!(Timestamp::parse_iso8601(&s).unwrap(), t);
    }

    #[test]
    fn test_iso8601_parse_with_offset() {
        let t = Timestamp::parse_iso8601("2024-01-01T14:00:00.000+02:00").unwrap();
        assert_eq!(t.to_iso8601().unwrap(), "2024-01-01T12:00:00.000Z");
    }

    #[test]
    fn test_iso8601_parse_truncates_sub_millis() {
        let t = Timestamp::parse_iso8601("2024-01-01T12:00:00.123456Z").unwrap();
        assert_eq!(t.as_millis() % 1000, 123);
    }

    #[test]
    fn test_iso8601_parse_invalid() {
        let err = Timestamp::parse_iso8601("yesterday").unwrap_err();
        assert!(matches!(err, AppError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_iso8601_out_of_range() {
        let err = Timestamp::from_millis(i64::MAX).to_iso8601().unwrap_err();
        assert!(matches!(err, AppError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_validator_trait() {
        struct TestType {
            value: i32,
        }

        impl Validator for TestType {
            fn validate(&self) -> Result<(), Vec<String>> {
                if self.value < 0 {
                    Err(vec!["Value must be positive".to_string()])
                } else {
                    Ok(())
                }
            }
        }

        assert!(TestType { value: 10 }.is_valid());
        assert!(!TestType { value: -5 }.is_valid());
    }
}
