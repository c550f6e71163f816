//! Daily aggregation: raw `1d` intervals to [`DailyForecast`] records.

use std::collections::HashSet;

use chrono::FixedOffset;

use skycast_core::ValidationError;

use crate::coerce::{apparent_temperature, number_field, time_field, NumericField, TimeField};
use crate::types::{DailyForecast, RawInterval};
use crate::validate::{validate_interval, ValidInterval};

/// How invalid intervals are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyMode {
    /// Any invalid interval rejects the whole batch. Used for persisted snapshots.
    Strict,
    /// Invalid intervals are skipped and counted. Used for display.
    Lenient,
}

/// Output of the daily aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBatch {
    /// Chronological, one record per date
    pub days: Vec<DailyForecast>,
    /// Intervals dropped (invalid or duplicate date)
    pub skipped: usize,
    /// UTC offset of the first valid interval, i.e. the location's local time
    pub utc_offset: Option<FixedOffset>,
}

/// Aggregate raw daily intervals.
///
/// At most `limit` days are kept, earliest first.
///
/// # Errors
/// In [`DailyMode::Strict`], returns the first interval's `ValidationError`.
pub fn aggregate_daily(
    intervals: &[RawInterval],
    mode: DailyMode,
    limit: usize,
) -> Result<DailyBatch, ValidationError> {
    let mut days = Vec::with_capacity(intervals.len());
    let mut seen = HashSet::new();
    let mut skipped = 0;
    let mut utc_offset = None;

    for (index, raw) in intervals.iter().enumerate() {
        let valid = match validate_interval(index, raw) {
            Ok(v) => v,
            Err(e) if mode == DailyMode::Strict => {
                tracing::warn!("Rejecting daily batch: {}", e);
                return Err(e);
            }
            Err(e) => {
                tracing::debug!("Skipping daily interval: {}", e);
                skipped += 1;
                continue;
            }
        };

        let day = coerce_day(&valid);
        if !seen.insert(day.date) {
            tracing::debug!("Skipping duplicate daily interval for {}", day.date);
            skipped += 1;
            continue;
        }

        utc_offset.get_or_insert(*valid.start.offset());
        days.push(day);
    }

    days.sort_by_key(|d| d.date);
    days.truncate(limit);

    if skipped > 0 {
        tracing::warn!("Skipped {} of {} daily intervals", skipped, intervals.len());
    }

    Ok(DailyBatch {
        days,
        skipped,
        utc_offset,
    })
}

/// Build one canonical record from a validated interval.
pub fn coerce_day(valid: &ValidInterval<'_>) -> DailyForecast {
    let raw = valid.raw;
    DailyForecast {
        date: valid.start.date_naive(),
        temperature_max: number_field(raw, NumericField::TemperatureMax),
        temperature_min: number_field(raw, NumericField::TemperatureMin),
        wind_speed: number_field(raw, NumericField::WindSpeed),
        weather_code: number_field(raw, NumericField::WeatherCode),
        humidity: number_field(raw, NumericField::Humidity),
        visibility: number_field(raw, NumericField::Visibility),
        cloud_cover: number_field(raw, NumericField::CloudCover),
        uv_index: number_field(raw, NumericField::UvIndex),
        pressure_sea_level: number_field(raw, NumericField::PressureSeaLevel),
        apparent_temperature: apparent_temperature(raw),
        precipitation_probability: number_field(raw, NumericField::PrecipitationProbability),
        sunrise: time_field(raw, TimeField::Sunrise),
        sunset: time_field(raw, TimeField::Sunset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intervals(value: serde_json::Value) -> Vec<RawInterval> {
        serde_json::from_value(value).unwrap()
    }

    fn scenario_a() -> Vec<RawInterval> {
        intervals(json!([{
            "startTime": "2024-01-01T00:00:00Z",
            "values": {
                "temperatureMax": 50, "temperatureMin": 30, "windSpeed": 5,
                "humidity": 60, "visibility": 10, "cloudCover": 20
            }
        }]))
    }

    #[test]
    fn test_scenario_a_defaults() {
        let batch = aggregate_daily(&scenario_a(), DailyMode::Strict, 15).unwrap();
        let day = &batch.days[0];

        assert_eq!(day.date.to_string(), "2024-01-01");
        assert_eq!(day.weather_code, 1000.0);
        assert_eq!(day.sunrise, None);
        assert_eq!(day.sunset, None);
        assert_eq!(day.temperature_max, 50.0);
        assert_eq!(day.pressure_sea_level, 29.92);
        assert_eq!(day.apparent_temperature, 50.0);
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn test_missing_numeric_fields_are_finite() {
        let raw = intervals(json!([{
            "startTime": "2024-01-02T00:00:00Z",
            "values": { "temperatureMax": "oops", "humidity": null }
        }]));
        let day = &aggregate_daily(&raw, DailyMode::Lenient, 15).unwrap().days[0];

        for value in [
            day.temperature_max,
            day.temperature_min,
            day.wind_speed,
            day.weather_code,
            day.humidity,
            day.visibility,
            day.cloud_cover,
            day.uv_index,
            day.pressure_sea_level,
            day.apparent_temperature,
            day.precipitation_probability,
        ] {
            assert!(value.is_finite());
        }
        assert_eq!(day.temperature_max, 0.0);
    }

    #[test]
    fn test_strict_mode_rejects_batch() {
        let raw = intervals(json!([
            { "startTime": "2024-01-01T00:00:00Z", "values": {} },
            { "values": {} }
        ]));
        let err = aggregate_daily(&raw, DailyMode::Strict, 15).unwrap_err();
        assert_eq!(err, ValidationError::MissingStartTime { index: 1 });
    }

    #[test]
    fn test_lenient_mode_skips_and_counts() {
        let raw = intervals(json!([
            { "startTime": "2024-01-01T00:00:00Z", "values": {} },
            { "startTime": "garbage", "values": {} },
            { "startTime": "2024-01-02T00:00:00Z" },
            { "startTime": "2024-01-03T00:00:00Z", "values": {} }
        ]));
        let batch = aggregate_daily(&raw, DailyMode::Lenient, 15).unwrap();
        assert_eq!(batch.days.len(), 2);
        assert_eq!(batch.skipped, 2);
    }

    #[test]
    fn test_output_is_sorted_and_unique() {
        let raw = intervals(json!([
            { "startTime": "2024-01-03T00:00:00Z", "values": { "temperatureMax": 3 } },
            { "startTime": "2024-01-01T00:00:00Z", "values": { "temperatureMax": 1 } },
            { "startTime": "2024-01-01T12:00:00Z", "values": { "temperatureMax": 99 } },
            { "startTime": "2024-01-02T00:00:00Z", "values": { "temperatureMax": 2 } }
        ]));
        let batch = aggregate_daily(&raw, DailyMode::Lenient, 15).unwrap();
        let dates: Vec<String> = batch.days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(batch.days[0].temperature_max, 1.0);
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn test_limit_keeps_earliest_days() {
        let raw: Vec<RawInterval> = (1..=20)
            .map(|d| RawInterval {
                start_time: Some(format!("2024-01-{:02}T00:00:00Z", d)),
                values: Some(serde_json::Map::new()),
            })
            .collect();
        let batch = aggregate_daily(&raw, DailyMode::Lenient, 15).unwrap();
        assert_eq!(batch.days.len(), 15);
        assert_eq!(batch.days[14].date.to_string(), "2024-01-15");
    }

    #[test]
    fn test_local_date_and_offset_preserved() {
        let raw = intervals(json!([
            { "startTime": "2024-01-01T06:00:00-06:00", "values": {} }
        ]));
        let batch = aggregate_daily(&raw, DailyMode::Strict, 15).unwrap();
        assert_eq!(batch.days[0].date.to_string(), "2024-01-01");
        assert_eq!(batch.utc_offset.unwrap().local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let raw = scenario_a();
        let first = aggregate_daily(&raw, DailyMode::Lenient, 15).unwrap();
        let second = aggregate_daily(&raw, DailyMode::Lenient, 15).unwrap();
        assert_eq!(
            serde_json::to_vec(&first.days).unwrap(),
            serde_json::to_vec(&second.days).unwrap()
        );
    }

    #[test]
    fn test_empty_input_is_empty_batch() {
        let batch = aggregate_daily(&[], DailyMode::Strict, 15).unwrap();
        assert!(batch.days.is_empty());
        assert!(batch.utc_offset.is_none());
    }
}
