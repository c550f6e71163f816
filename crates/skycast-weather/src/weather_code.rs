//! Provider weather codes mapped to descriptions and icon ids.

use serde::{Deserialize, Serialize};

use crate::types::DailyForecast;

/// Code used when the provider omits or garbles `weatherCode`
pub const DEFAULT_WEATHER_CODE: f64 = 1000.0;

/// Weather conditions reported by the timelines API.
///
/// Lookups are total: anything outside the table becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCode {
    #[default]
    Clear,
    MostlyClear,
    PartlyCloudy,
    MostlyCloudy,
    Cloudy,
    Fog,
    LightFog,
    Drizzle,
    Rain,
    LightRain,
    HeavyRain,
    Snow,
    Flurries,
    LightSnow,
    HeavySnow,
    FreezingDrizzle,
    FreezingRain,
    LightFreezingRain,
    HeavyFreezingRain,
    IcePellets,
    HeavyIcePellets,
    LightIcePellets,
    Thunderstorm,
    Unknown(i64),
}

impl WeatherCode {
    /// Convert a numeric provider code.
    pub fn from_code(code: f64) -> Self {
        if !code.is_finite() || code.fract() != 0.0 {
            return Self::Unknown(-1);
        }
        match code as i64 {
            1000 => Self::Clear,
            1100 => Self::MostlyClear,
            1101 => Self::PartlyCloudy,
            1102 => Self::MostlyCloudy,
            1001 => Self::Cloudy,
            2000 => Self::Fog,
            2100 => Self::LightFog,
            4000 => Self::Drizzle,
            4001 => Self::Rain,
            4200 => Self::LightRain,
            4201 => Self::HeavyRain,
            5000 => Self::Snow,
            5001 => Self::Flurries,
            5100 => Self::LightSnow,
            5101 => Self::HeavySnow,
            6000 => Self::FreezingDrizzle,
            6001 => Self::FreezingRain,
            6200 => Self::LightFreezingRain,
            6201 => Self::HeavyFreezingRain,
            7000 => Self::IcePellets,
            7101 => Self::HeavyIcePellets,
            7102 => Self::LightIcePellets,
            8000 => Self::Thunderstorm,
            other => Self::Unknown(other),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear, Sunny",
            Self::MostlyClear => "Mostly Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::MostlyCloudy => "Mostly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::LightFog => "Light Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::LightRain => "Light Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Flurries => "Flurries",
            Self::LightSnow => "Light Snow",
            Self::HeavySnow => "Heavy Snow",
            Self::FreezingDrizzle => "Freezing Drizzle",
            Self::FreezingRain => "Freezing Rain",
            Self::LightFreezingRain => "Light Freezing Rain",
            Self::HeavyFreezingRain => "Heavy Freezing Rain",
            Self::IcePellets => "Ice Pellets",
            Self::HeavyIcePellets => "Heavy Ice Pellets",
            Self::LightIcePellets => "Light Ice Pellets",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Icon asset id for the renderer
    pub fn icon_id(&self) -> &'static str {
        match self {
            Self::Clear => "clear_day",
            Self::MostlyClear | Self::PartlyCloudy => "mostly_clear_day",
            Self::MostlyCloudy => "mostly_cloudy",
            Self::Cloudy => "cloudy",
            Self::Fog => "fog",
            Self::LightFog => "fog_light",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::LightRain => "rain_light",
            Self::HeavyRain => "rain_heavy",
            Self::Snow => "snow",
            Self::Flurries => "flurries",
            Self::LightSnow => "snow_light",
            Self::HeavySnow => "snow_heavy",
            Self::FreezingDrizzle => "freezing_drizzle",
            Self::FreezingRain => "freezing_rain",
            Self::LightFreezingRain => "freezing_rain_light",
            Self::HeavyFreezingRain => "freezing_rain_heavy",
            Self::IcePellets => "ice_pellets",
            Self::HeavyIcePellets => "ice_pellets_heavy",
            Self::LightIcePellets => "ice_pellets_light",
            Self::Thunderstorm => "tstorm",
            Self::Unknown(_) => "default",
        }
    }
}

impl DailyForecast {
    pub fn condition(&self) -> WeatherCode {
        WeatherCode::from_code(self.weather_code)
    }
}
