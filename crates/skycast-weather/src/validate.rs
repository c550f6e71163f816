//! Minimum-shape checks for raw intervals.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use skycast_core::ValidationError;

use crate::coerce::parse_timestamp;
use crate::types::RawInterval;

/// An interval that passed validation, with its start time parsed.
#[derive(Debug, Clone, Copy)]
pub struct ValidInterval<'a> {
    pub raw: &'a RawInterval,
    pub start: DateTime<FixedOffset>,
    pub values: &'a Map<String, Value>,
}

/// Check that `interval` has a parseable `startTime` and a `values` object.
///
/// `index` is the interval's position in its timeline, used for diagnostics.
pub fn validate_interval(
    index: usize,
    interval: &RawInterval,
) -> Result<ValidInterval<'_>, ValidationError> {
    let text = interval
        .start_time
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::MissingStartTime { index })?;

    let start = parse_timestamp(text).ok_or_else(|| ValidationError::InvalidStartTime {
        index,
        value: text.to_string(),
    })?;

    let values = interval
        .values
        .as_ref()
        .ok_or(ValidationError::MissingValues { index })?;

    Ok(ValidInterval {
        raw: interval,
        start,
        values,
    })
}

/// Pass/fail form of [`validate_interval`].
pub fn is_valid(interval: &RawInterval) -> bool {
    validate_interval(0, interval).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn interval(value: serde_json::Value) -> RawInterval {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_interval_passes() {
        let raw = interval(json!({ "startTime": "2024-01-01T00:00:00Z", "values": {} }));
        let valid = validate_interval(0, &raw).unwrap();
        assert_eq!(valid.start.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_missing_start_time_fails() {
        let raw = interval(json!({ "values": { "temperature": 50 } }));
        assert_eq!(
            validate_interval(3, &raw).unwrap_err(),
            ValidationError::MissingStartTime { index: 3 }
        );
    }

    #[test]
    fn test_blank_start_time_fails() {
        let raw = interval(json!({ "startTime": "  ", "values": {} }));
        assert!(!is_valid(&raw));
    }

    #[test]
    fn test_unparseable_start_time_fails() {
        let raw = interval(json!({ "startTime": "not a date", "values": {} }));
        assert!(matches!(
            validate_interval(1, &raw),
            Err(ValidationError::InvalidStartTime { index: 1, .. })
        ));
    }

    #[test]
    fn test_missing_values_fails() {
        let raw = interval(json!({ "startTime": "2024-01-01T00:00:00Z" }));
        assert_eq!(
            validate_interval(0, &raw).unwrap_err(),
            ValidationError::MissingValues { index: 0 }
        );
    }

    #[test]
    fn test_null_values_fails() {
        let raw = interval(json!({ "startTime": "2024-01-01T00:00:00Z", "values": null }));
        assert!(!is_valid(&raw));
    }
}
