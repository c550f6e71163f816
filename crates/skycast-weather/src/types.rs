use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use skycast_core::UpstreamError;

/// Provider granularity tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestep {
    Daily,
    Hourly,
}

impl Timestep {
    pub fn tag(self) -> &'static str {
        match self {
            Timestep::Daily => "1d",
            Timestep::Hourly => "1h",
        }
    }
}

/// One timestamped record as delivered by the provider.
///
/// Both fields are optional on the wire; the validator decides whether the
/// interval may enter the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInterval {
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub values: Option<Map<String, Value>>,
}

impl RawInterval {
    /// Raw value for a field, `None` when absent.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.as_ref().and_then(|v| v.get(key))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Timeline {
    pub timestep: String,
    #[serde(default)]
    pub intervals: Vec<RawInterval>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimelineData {
    #[serde(default)]
    pub timelines: Vec<Timeline>,
}

/// `{ data: { timelines: [...] } }`
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineResponse {
    pub data: TimelineData,
}

impl TimelineResponse {
    /// Find the timeline tagged with `step`.
    pub fn timeline(&self, step: Timestep) -> Option<&Timeline> {
        self.data.timelines.iter().find(|t| t.timestep == step.tag())
    }

    /// Like [`timeline`](Self::timeline), but absence is an upstream failure.
    pub fn require(&self, step: Timestep) -> Result<&Timeline, UpstreamError> {
        self.timeline(step)
            .ok_or_else(|| UpstreamError::MissingTimeline(step.tag().to_string()))
    }
}

/// Canonical per-day forecast record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub wind_speed: f64,
    pub weather_code: f64,
    pub humidity: f64,
    pub visibility: f64,
    pub cloud_cover: f64,
    pub uv_index: f64,
    pub pressure_sea_level: f64,
    pub apparent_temperature: f64,
    pub precipitation_probability: f64,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// Canonical hourly point used for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    /// Degrees in `[0, 360)`; meaningful even when wind speed is zero
    pub wind_direction: f64,
    pub precipitation_probability: f64,
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Location metadata attached to a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub street: String,
    pub city: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Complete forecast handed to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub location: Location,
    pub daily: Vec<DailyForecast>,
    pub hourly: Vec<HourlyPoint>,
    pub hourly_is_synthetic: bool,
    pub is_favorite: bool,
    pub favorite_id: Option<String>,
    /// Daily intervals dropped during lenient aggregation
    pub skipped_count: usize,
}

impl ForecastResult {
    /// Detail record for one day
    pub fn day(&self, date: NaiveDate) -> Option<&DailyForecast> {
        self.daily.iter().find(|d| d.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_lookup_by_tag() {
        let response: TimelineResponse = serde_json::from_value(serde_json::json!({
            "data": { "timelines": [
                { "timestep": "1h", "intervals": [] },
                { "timestep": "1d", "intervals": [{ "startTime": "2024-01-01T00:00:00Z", "values": {} }] }
            ]}
        }))
        .unwrap();

        assert_eq!(response.timeline(Timestep::Daily).unwrap().intervals.len(), 1);
        assert!(response.timeline(Timestep::Hourly).unwrap().intervals.is_empty());
    }

    #[test]
    fn test_missing_timeline_is_upstream_error() {
        let response: TimelineResponse = serde_json::from_value(serde_json::json!({
            "data": { "timelines": [{ "timestep": "1h" }] }
        }))
        .unwrap();

        let err = response.require(Timestep::Daily).unwrap_err();
        assert_eq!(err, UpstreamError::MissingTimeline("1d".to_string()));
    }

    #[test]
    fn test_raw_interval_tolerates_missing_fields() {
        let raw: RawInterval = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(raw.start_time.is_none());
        assert!(raw.values.is_none());
        assert!(raw.value("temperature").is_none());
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates { lat: 30.27, lon: -97.74 }.is_valid());
        assert!(!Coordinates { lat: 91.0, lon: 0.0 }.is_valid());
        assert!(!Coordinates { lat: f64::NAN, lon: 0.0 }.is_valid());
    }
}
