//! Field coercion: raw provider values to canonical numbers and times.
//!
//! Nothing here fails. Missing, non-numeric or non-finite values are replaced
//! by the field's default; unparseable times become `None`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::types::RawInterval;
use crate::weather_code::DEFAULT_WEATHER_CODE;

/// Sea-level pressure default, inHg
pub const DEFAULT_PRESSURE_INHG: f64 = 29.92;

/// Numeric provider fields and their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Temperature,
    TemperatureMax,
    TemperatureMin,
    WindSpeed,
    WindDirection,
    WeatherCode,
    Humidity,
    Visibility,
    CloudCover,
    UvIndex,
    PressureSeaLevel,
    PrecipitationProbability,
}

impl NumericField {
    /// Key used in the provider's `values` object
    pub fn key(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::TemperatureMax => "temperatureMax",
            Self::TemperatureMin => "temperatureMin",
            Self::WindSpeed => "windSpeed",
            Self::WindDirection => "windDirection",
            Self::WeatherCode => "weatherCode",
            Self::Humidity => "humidity",
            Self::Visibility => "visibility",
            Self::CloudCover => "cloudCover",
            Self::UvIndex => "uvIndex",
            Self::PressureSeaLevel => "pressureSeaLevel",
            Self::PrecipitationProbability => "precipitationProbability",
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            Self::PressureSeaLevel => DEFAULT_PRESSURE_INHG,
            Self::WeatherCode => DEFAULT_WEATHER_CODE,
            _ => 0.0,
        }
    }
}

/// Time fields that degrade to `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Sunrise,
    Sunset,
}

impl TimeField {
    pub fn key(self) -> &'static str {
        match self {
            Self::Sunrise => "sunriseTime",
            Self::Sunset => "sunsetTime",
        }
    }
}

/// Interpret a raw JSON value as a finite number.
///
/// Numbers pass through, numeric strings are parsed. `null`, booleans,
/// objects and anything non-finite yield `None`.
pub fn finite_number(raw: Option<&Value>) -> Option<f64> {
    let n = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce a raw value for `field`, substituting its default.
pub fn coerce_number(raw: Option<&Value>, field: NumericField) -> f64 {
    finite_number(raw).unwrap_or_else(|| field.default_value())
}

/// Read and coerce `field` from an interval.
pub fn number_field(interval: &RawInterval, field: NumericField) -> f64 {
    coerce_number(interval.value(field.key()), field)
}

/// Coerce a time value to an RFC 3339 UTC string, or `None`.
pub fn coerce_time(raw: Option<&Value>) -> Option<String> {
    let text = raw?.as_str()?;
    parse_timestamp(text).map(|dt| {
        dt.with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    })
}

pub fn time_field(interval: &RawInterval, field: TimeField) -> Option<String> {
    coerce_time(interval.value(field.key()))
}

/// Apparent temperature: `temperature`, else `temperatureMax`, else 0.
pub fn apparent_temperature(interval: &RawInterval) -> f64 {
    finite_number(interval.value(NumericField::Temperature.key()))
        .or_else(|| finite_number(interval.value(NumericField::TemperatureMax.key())))
        .unwrap_or(0.0)
}

/// Wrap a direction into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

/// Parse the date formats the provider emits.
///
/// Accepts RFC 3339, offset-less `YYYY-MM-DDTHH:MM:SS` (read as UTC) and bare
/// `YYYY-MM-DD` (midnight UTC). The original offset is preserved so callers
/// can recover the location's calendar date.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().with_timezone(&utc));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().with_timezone(&utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_passthrough() {
        assert_eq!(coerce_number(Some(&json!(42.5)), NumericField::Humidity), 42.5);
        assert_eq!(coerce_number(Some(&json!(0)), NumericField::WindSpeed), 0.0);
    }

    #[test]
    fn test_numeric_string_is_parsed() {
        assert_eq!(coerce_number(Some(&json!(" 12.5 ")), NumericField::Visibility), 12.5);
    }

    #[test]
    fn test_missing_uses_field_default() {
        assert_eq!(coerce_number(None, NumericField::TemperatureMax), 0.0);
        assert_eq!(coerce_number(None, NumericField::PressureSeaLevel), 29.92);
        assert_eq!(coerce_number(None, NumericField::WeatherCode), 1000.0);
    }

    #[test]
    fn test_malformed_uses_field_default() {
        assert_eq!(coerce_number(Some(&json!("n/a")), NumericField::WeatherCode), 1000.0);
        assert_eq!(coerce_number(Some(&json!(null)), NumericField::PressureSeaLevel), 29.92);
        assert_eq!(coerce_number(Some(&json!(true)), NumericField::CloudCover), 0.0);
        assert_eq!(coerce_number(Some(&json!("NaN")), NumericField::UvIndex), 0.0);
        assert_eq!(coerce_number(Some(&json!("inf")), NumericField::Humidity), 0.0);
    }

    #[test]
    fn test_time_is_normalized_to_utc() {
        let value = json!("2024-01-01T07:15:00-06:00");
        assert_eq!(
            coerce_time(Some(&value)).as_deref(),
            Some("2024-01-01T13:15:00.000Z")
        );
    }

    #[test]
    fn test_bad_time_is_none() {
        assert_eq!(coerce_time(Some(&json!("sometime tomorrow"))), None);
        assert_eq!(coerce_time(Some(&json!(12345))), None);
        assert_eq!(coerce_time(Some(&json!(null))), None);
        assert_eq!(coerce_time(None), None);
    }

    #[test]
    fn test_apparent_temperature_fallback_chain() {
        let with_temp: RawInterval = serde_json::from_value(json!({
            "startTime": "2024-01-01T00:00:00Z",
            "values": { "temperature": 41.0, "temperatureMax": 50.0 }
        }))
        .unwrap();
        assert_eq!(apparent_temperature(&with_temp), 41.0);

        let max_only: RawInterval = serde_json::from_value(json!({
            "startTime": "2024-01-01T00:00:00Z",
            "values": { "temperature": "bogus", "temperatureMax": 50.0 }
        }))
        .unwrap();
        assert_eq!(apparent_temperature(&max_only), 50.0);

        let neither: RawInterval = serde_json::from_value(json!({
            "startTime": "2024-01-01T00:00:00Z",
            "values": {}
        }))
        .unwrap();
        assert_eq!(apparent_temperature(&neither), 0.0);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-01T00:00:00Z").is_some());
        assert!(parse_timestamp("2024-01-01T00:00:00").is_some());
        assert!(parse_timestamp("2024-01-01").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_timestamp_keeps_offset() {
        let dt = parse_timestamp("2024-03-05T23:00:00-06:00").unwrap();
        assert_eq!(dt.date_naive().to_string(), "2024-03-05");
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }
}
