//! Timelines API client.
//!
//! One attempt per request. A slow or failed provider surfaces immediately as
//! an [`UpstreamError`] carrying the provider's status and body.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use tracing::instrument;

use skycast_core::{ProviderConfig, ReqwestErrorExt, UpstreamError, Units};

use crate::types::{Coordinates, TimelineResponse, Timestep};

const PROVIDER: &str = "weather provider";

/// Fields requested for every timeline.
pub const FORECAST_FIELDS: &[&str] = &[
    "temperature",
    "temperatureMax",
    "temperatureMin",
    "windSpeed",
    "windDirection",
    "humidity",
    "weatherCode",
    "precipitationProbability",
    "pressureSeaLevel",
    "cloudCover",
    "uvIndex",
    "visibility",
    "sunriseTime",
    "sunsetTime",
];

#[derive(Debug, Clone)]
pub struct TimelinesClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    units: Units,
    forecast_days: u32,
}

impl TimelinesClient {
    /// # Errors
    /// Returns `UpstreamError` if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| e.into_upstream_error(PROVIDER))?;

        if config.api_key.is_none() {
            tracing::warn!("No weather provider API key configured");
        }

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            units: config.units,
            forecast_days: config.forecast_days,
        })
    }

    /// Daily and hourly timelines for the configured forecast window.
    ///
    /// # Errors
    /// Returns `UpstreamError` on transport failure, non-2xx status or an
    /// unparseable body.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<TimelineResponse, UpstreamError> {
        self.fetch(coordinates, &[Timestep::Daily, Timestep::Hourly])
            .await
    }

    /// Hourly timeline only, for the meteogram view.
    ///
    /// # Errors
    /// Same as [`fetch_forecast`](Self::fetch_forecast).
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_meteogram(
        &self,
        coordinates: Coordinates,
    ) -> Result<TimelineResponse, UpstreamError> {
        self.fetch(coordinates, &[Timestep::Hourly]).await
    }

    async fn fetch(
        &self,
        coordinates: Coordinates,
        timesteps: &[Timestep],
    ) -> Result<TimelineResponse, UpstreamError> {
        let url = format!("{}/timelines", self.base_url);
        let now = Utc::now();
        let end = now + chrono::Duration::days(i64::from(self.forecast_days));

        let timesteps = timesteps
            .iter()
            .map(|t| t.tag())
            .collect::<Vec<_>>()
            .join(",");

        let mut query = vec![
            ("location", format!("{},{}", coordinates.lat, coordinates.lon)),
            ("fields", FORECAST_FIELDS.join(",")),
            ("timesteps", timesteps),
            ("units", self.units.as_str().to_string()),
            ("timezone", "auto".to_string()),
            ("startTime", now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("endTime", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| e.into_upstream_error(PROVIDER))?;

        self.handle_response(response).await
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<TimelineResponse, UpstreamError> {
        let status = response.status();

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Weather provider returned {}: {}", status, detail);
            return Err(UpstreamError::Provider {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| e.into_upstream_error(PROVIDER))?;

        serde_json::from_str(&body).map_err(|e| UpstreamError::InvalidResponse {
            provider: PROVIDER.to_string(),
            message: e.to_string(),
        })
    }
}
