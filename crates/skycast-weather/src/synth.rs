//! Synthetic hourly series derived from daily records.
//!
//! Used only when the provider returned no usable hourly data, so charts
//! always have a series to draw. Results must be flagged synthetic.
//!
//! Temperature follows `min + (max - min) * (0.5 + 0.5 * sin(PI*h/24 - PI/2))`
//! within each day. Days are not blended into each other, so hour 23 of one
//! day and hour 0 of the next are generally discontinuous.

use std::f64::consts::PI;

use chrono::{Duration, FixedOffset, TimeZone};
use rand::Rng;

use crate::types::{DailyForecast, HourlyPoint};

pub const HOURS_PER_DAY: u32 = 24;

/// Wind direction step between consecutive synthetic hours, degrees
pub const WIND_STEP_DEGREES: f64 = 15.0;

/// Expand each day into 24 hourly points at local hours 00..23.
///
/// `offset` is the location's UTC offset; each day's wind pattern starts
/// from a random base angle drawn from `rng`.
pub fn synthesize_hourly<R: Rng>(
    days: &[DailyForecast],
    offset: FixedOffset,
    rng: &mut R,
) -> Vec<HourlyPoint> {
    let mut points = Vec::with_capacity(days.len() * HOURS_PER_DAY as usize);

    for day in days {
        let Some(midnight) = day
            .date
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| offset.from_local_datetime(&naive).single())
        else {
            tracing::warn!("Cannot place synthetic hours for {}", day.date);
            continue;
        };

        let base_direction: f64 = rng.gen_range(0.0..360.0);

        for hour in 0..HOURS_PER_DAY {
            let h = f64::from(hour);
            let timestamp = midnight + Duration::hours(i64::from(hour));

            points.push(HourlyPoint {
                timestamp: timestamp.timestamp_millis(),
                temperature: interpolate_temperature(day.temperature_min, day.temperature_max, h),
                humidity: day.humidity,
                pressure: day.pressure_sea_level,
                wind_speed: day.wind_speed,
                wind_direction: (base_direction + h * WIND_STEP_DEGREES) % 360.0,
                precipitation_probability: day.precipitation_probability,
            });
        }
    }

    points
}

/// Half-sinusoid between the day's min and max for hour `h` in `[0, 24)`.
pub fn interpolate_temperature(min: f64, max: f64, h: f64) -> f64 {
    let phase = PI * h / f64::from(HOURS_PER_DAY) - PI / 2.0;
    min + (max - min) * (0.5 + 0.5 * phase.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(date: &str, min: f64, max: f64) -> DailyForecast {
        DailyForecast {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            temperature_max: max,
            temperature_min: min,
            wind_speed: 7.0,
            weather_code: 1000.0,
            humidity: 55.0,
            visibility: 10.0,
            cloud_cover: 0.0,
            uv_index: 3.0,
            pressure_sea_level: 30.1,
            apparent_temperature: max,
            precipitation_probability: 20.0,
            sunrise: None,
            sunset: None,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_produces_24_points_per_day() {
        let days = vec![day("2024-01-01", 30.0, 50.0), day("2024-01-02", 32.0, 48.0)];
        let mut rng = StdRng::seed_from_u64(7);
        let points = synthesize_hourly(&days, utc(), &mut rng);

        assert_eq!(points.len(), 48);
        assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_strictly_increasing_with_offset() {
        let days: Vec<DailyForecast> = (1..=5)
            .map(|d| day(&format!("2024-03-{:02}", d), 40.0, 60.0))
            .collect();
        let offset = FixedOffset::west_opt(6 * 3600).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let points = synthesize_hourly(&days, offset, &mut rng);

        assert_eq!(points.len(), 24 * 5);
        assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        // Midnight in UTC-6 is 06:00Z
        assert_eq!(points[0].timestamp, 1_709_272_800_000);
    }

    #[test]
    fn test_temperature_starts_at_min_and_stays_in_range() {
        let days = vec![day("2024-01-01", 30.0, 50.0)];
        let mut rng = StdRng::seed_from_u64(3);
        let points = synthesize_hourly(&days, utc(), &mut rng);

        assert!((points[0].temperature - 30.0).abs() < 1e-9);
        assert!((points[12].temperature - 40.0).abs() < 1e-9);
        assert!(points.iter().all(|p| (30.0..=50.0).contains(&p.temperature)));
    }

    #[test]
    fn test_flat_fields_copied_from_day() {
        let days = vec![day("2024-01-01", 30.0, 50.0)];
        let mut rng = StdRng::seed_from_u64(3);
        let points = synthesize_hourly(&days, utc(), &mut rng);

        assert!(points.iter().all(|p| p.humidity == 55.0
            && p.pressure == 30.1
            && p.wind_speed == 7.0
            && p.precipitation_probability == 20.0));
    }

    #[test]
    fn test_wind_direction_rotates_and_wraps() {
        let days = vec![day("2024-01-01", 30.0, 50.0)];
        let mut rng = StdRng::seed_from_u64(11);
        let points = synthesize_hourly(&days, utc(), &mut rng);

        for pair in points.windows(2) {
            assert!((0.0..360.0).contains(&pair[1].wind_direction));
            let step = (pair[1].wind_direction - pair[0].wind_direction).rem_euclid(360.0);
            assert!((step - WIND_STEP_DEGREES).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_days_yield_empty_series() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(synthesize_hourly(&[], utc(), &mut rng).is_empty());
    }
}
