//! Hourly aggregation: raw `1h` intervals to [`HourlyPoint`]s.
//!
//! Lenient only. Hourly data backs optional charts, so a bad interval is
//! dropped rather than failing the forecast.

use crate::coerce::{normalize_degrees, number_field, NumericField};
use crate::types::{HourlyPoint, RawInterval};
use crate::validate::validate_interval;

/// Aggregate raw hourly intervals.
///
/// Output is ascending by timestamp; on duplicate timestamps the first
/// occurrence in input order wins. At most `limit` points are kept.
pub fn aggregate_hourly(intervals: &[RawInterval], limit: usize) -> Vec<HourlyPoint> {
    let mut points: Vec<HourlyPoint> = intervals
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match validate_interval(index, raw) {
            Ok(valid) => Some(HourlyPoint {
                timestamp: valid.start.timestamp_millis(),
                temperature: number_field(raw, NumericField::Temperature),
                humidity: number_field(raw, NumericField::Humidity),
                pressure: number_field(raw, NumericField::PressureSeaLevel),
                wind_speed: number_field(raw, NumericField::WindSpeed),
                wind_direction: normalize_degrees(number_field(raw, NumericField::WindDirection)),
                precipitation_probability: number_field(
                    raw,
                    NumericField::PrecipitationProbability,
                ),
            }),
            Err(e) => {
                tracing::debug!("Dropping hourly interval: {}", e);
                None
            }
        })
        .collect();

    let valid = points.len();

    // Stable sort keeps input order among equal timestamps.
    points.sort_by_key(|p| p.timestamp);
    points.dedup_by_key(|p| p.timestamp);
    points.truncate(limit);

    if valid < intervals.len() {
        tracing::debug!(
            "Dropped {} of {} hourly intervals",
            intervals.len() - valid,
            intervals.len()
        );
    }

    points
}
