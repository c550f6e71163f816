//! Forecast pipeline for Skycast
//!
//! Turns raw provider timelines into a validated, chronologically ordered
//! forecast: interval validation, field coercion, daily and hourly
//! aggregation, synthetic hourly fallback and final assembly.

pub mod assemble;
pub mod coerce;
pub mod daily;
pub mod geocode;
pub mod hourly;
pub mod location;
pub mod provider;
pub mod service;
pub mod synth;
pub mod types;
pub mod validate;
pub mod weather_code;

pub use assemble::{assemble, FavoriteIndex};
pub use daily::{aggregate_daily, DailyBatch, DailyMode};
pub use geocode::{Geocoder, IpLocation};
pub use hourly::aggregate_hourly;
pub use location::{LocationQuery, CURRENT_LOCATION};
pub use provider::TimelinesClient;
pub use service::ForecastService;
pub use synth::synthesize_hourly;
pub use types::*;
pub use validate::{is_valid, validate_interval};
pub use weather_code::WeatherCode;
