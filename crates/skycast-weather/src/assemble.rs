//! Forecast assembly: daily + hourly (real or synthetic) + location.

use chrono::{Offset, Utc};
use rand::Rng;

use skycast_core::{AssemblyError, DatabaseError};

use crate::daily::DailyBatch;
use crate::synth::synthesize_hourly;
use crate::types::{ForecastResult, HourlyPoint, Location};

/// Favorite membership lookup by exact, case-sensitive `(city, state)`.
pub trait FavoriteIndex: Send + Sync {
    /// Id of the favorite saved for this location, if any.
    ///
    /// # Errors
    /// Returns `DatabaseError` when the store cannot be queried.
    fn favorite_id(&self, city: &str, state: &str) -> Result<Option<String>, DatabaseError>;
}

/// Resolve favorite membership, treating lookup failures as "not a favorite".
pub fn lookup_favorite(index: Option<&dyn FavoriteIndex>, location: &Location) -> Option<String> {
    let index = index?;
    if location.city.is_empty() || location.state.is_empty() {
        return None;
    }
    match index.favorite_id(&location.city, &location.state) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(
                "Favorite lookup failed for {}, {}: {}",
                location.city,
                location.state,
                e
            );
            None
        }
    }
}

/// Combine aggregated data into a [`ForecastResult`].
///
/// When `hourly` is empty a synthetic series is derived from the daily
/// records; real and synthetic points are never mixed.
///
/// # Errors
/// Returns `AssemblyError::NoDailyData` when `daily` holds no days.
pub fn assemble<R: Rng>(
    location: Location,
    daily: DailyBatch,
    hourly: Vec<HourlyPoint>,
    favorite_id: Option<String>,
    rng: &mut R,
) -> Result<ForecastResult, AssemblyError> {
    if daily.days.is_empty() {
        tracing::warn!(
            "No valid daily data for {}, {} ({} skipped)",
            location.city,
            location.state,
            daily.skipped
        );
        return Err(AssemblyError::NoDailyData);
    }

    let (hourly, hourly_is_synthetic) = if hourly.is_empty() {
        let offset = daily.utc_offset.unwrap_or_else(|| Utc.fix());
        tracing::info!("No hourly data; synthesizing from {} days", daily.days.len());
        (synthesize_hourly(&daily.days, offset, rng), true)
    } else {
        (hourly, false)
    };

    Ok(ForecastResult {
        location,
        daily: daily.days,
        hourly,
        hourly_is_synthetic,
        is_favorite: favorite_id.is_some(),
        favorite_id,
        skipped_count: daily.skipped,
    })
}
