//! Forecast service: resolve → fetch → aggregate → assemble.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::instrument;

use skycast_core::{AppError, AssemblyError, Config, PipelineConfig};

use crate::assemble::{assemble, lookup_favorite, FavoriteIndex};
use crate::daily::{aggregate_daily, DailyMode};
use crate::geocode::Geocoder;
use crate::hourly::aggregate_hourly;
use crate::location::{resolve, LocationQuery};
use crate::provider::TimelinesClient;
use crate::types::{Coordinates, DailyForecast, ForecastResult, HourlyPoint, Location, Timestep};

#[derive(Clone)]
pub struct ForecastService {
    provider: TimelinesClient,
    geocoder: Geocoder,
    favorites: Option<Arc<dyn FavoriteIndex>>,
    pipeline: PipelineConfig,
}

impl std::fmt::Debug for ForecastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastService")
            .field("provider", &self.provider)
            .field("geocoder", &self.geocoder)
            .field("favorites", &self.favorites.is_some())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl ForecastService {
    /// # Errors
    /// Returns `AppError::Upstream` if an HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            provider: TimelinesClient::new(&config.provider)?,
            geocoder: Geocoder::new(&config.geocoding)?,
            favorites: None,
            pipeline: config.pipeline.clone(),
        })
    }

    /// Mark results whose location is saved in `index`.
    pub fn with_favorites(mut self, index: Arc<dyn FavoriteIndex>) -> Self {
        self.favorites = Some(index);
        self
    }

    /// Build a forecast for a user query.
    ///
    /// # Errors
    /// - `AppError::Validation` for a malformed query, or any invalid daily
    ///   interval in [`DailyMode::Strict`]
    /// - `AppError::Upstream` when geocoding or the provider fails
    /// - `AppError::Assembly` when no valid day survives
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(
        &self,
        query: &LocationQuery,
        mode: DailyMode,
    ) -> Result<ForecastResult, AppError> {
        let location = resolve(query, &self.geocoder).await?;
        self.forecast_at(location, mode).await
    }

    /// Build a forecast for an already resolved location.
    ///
    /// # Errors
    /// Same as [`forecast`](Self::forecast), minus query validation.
    pub async fn forecast_at(
        &self,
        location: Location,
        mode: DailyMode,
    ) -> Result<ForecastResult, AppError> {
        let response = self.provider.fetch_forecast(location.coordinates()).await?;

        let daily_raw = response.require(Timestep::Daily)?.intervals.clone();
        let hourly_raw = response
            .timeline(Timestep::Hourly)
            .map(|t| t.intervals.clone())
            .unwrap_or_default();

        let max_daily = self.pipeline.max_daily;
        let max_hourly = self.pipeline.max_hourly;
        let index = self.favorites.clone();
        let lookup_location = location.clone();

        // Daily, hourly and the favorite lookup share no data.
        let (daily, hourly, favorite_id) = tokio::join!(
            tokio::task::spawn_blocking(move || aggregate_daily(&daily_raw, mode, max_daily)),
            tokio::task::spawn_blocking(move || aggregate_hourly(&hourly_raw, max_hourly)),
            tokio::task::spawn_blocking(move || {
                lookup_favorite(index.as_deref(), &lookup_location)
            }),
        );

        let daily = daily.map_err(join_error)??;
        let hourly = hourly.map_err(join_error)?;
        let favorite_id = favorite_id.map_err(join_error)?;

        tracing::info!(
            "Aggregated {} days ({} skipped), {} hourly points for {}, {}",
            daily.days.len(),
            daily.skipped,
            hourly.len(),
            location.city,
            location.state
        );

        let mut rng = StdRng::from_entropy();
        Ok(assemble(location, daily, hourly, favorite_id, &mut rng)?)
    }

    /// Real hourly series only, never synthesized.
    ///
    /// # Errors
    /// Returns `AppError::Assembly(NoHourlyData)` when no valid hourly point
    /// survives, or `AppError::Upstream` when the provider fails.
    #[instrument(skip(self), level = "info")]
    pub async fn meteogram(&self, coordinates: Coordinates) -> Result<Vec<HourlyPoint>, AppError> {
        let response = self.provider.fetch_meteogram(coordinates).await?;
        let raw = response
            .timeline(Timestep::Hourly)
            .map(|t| t.intervals.clone())
            .unwrap_or_default();

        let max_hourly = self.pipeline.max_hourly;
        let points = tokio::task::spawn_blocking(move || aggregate_hourly(&raw, max_hourly))
            .await
            .map_err(join_error)?;

        if points.is_empty() {
            return Err(AssemblyError::NoHourlyData.into());
        }
        Ok(points)
    }

    /// Daily records to persist with a favorite. Uses strict aggregation so a
    /// snapshot is never built from partially invalid data.
    ///
    /// # Errors
    /// Returns `AppError::Validation` on the first invalid interval and
    /// `AppError::Assembly(NoDailyData)` when the timeline is empty.
    #[instrument(skip(self), level = "info")]
    pub async fn favorite_snapshot(
        &self,
        location: &Location,
    ) -> Result<Vec<DailyForecast>, AppError> {
        let response = self.provider.fetch_forecast(location.coordinates()).await?;
        let raw = response.require(Timestep::Daily)?.intervals.clone();

        let max_daily = self.pipeline.max_daily;
        let batch = tokio::task::spawn_blocking(move || {
            aggregate_daily(&raw, DailyMode::Strict, max_daily)
        })
        .await
        .map_err(join_error)??;

        if batch.days.is_empty() {
            return Err(AssemblyError::NoDailyData.into());
        }
        Ok(batch.days)
    }
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::Other(anyhow::anyhow!("Aggregation task failed: {}", e))
}
