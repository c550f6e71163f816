//! Favorite locations: record types, the storage trait and its errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skycast_core::{AppError, DatabaseError, PersistenceConflictError, ValidationError};
use skycast_weather::{DailyForecast, CURRENT_LOCATION};

/// A saved location with the forecast captured when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLocation {
    pub id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub snapshot: Vec<DailyForecast>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`FavoriteStore::insert`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewFavorite {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub snapshot: Vec<DailyForecast>,
}

impl NewFavorite {
    pub fn new(street: &str, city: &str, state: &str) -> Self {
        Self {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            snapshot: Vec::new(),
        }
    }

    pub fn with_snapshot(mut self, snapshot: Vec<DailyForecast>) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Trim fields and fill the street default.
    ///
    /// # Errors
    /// Returns `ValidationError::MissingField` when city or state is blank.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let city = self.city.trim().to_string();
        let state = self.state.trim().to_string();
        if city.is_empty() {
            return Err(ValidationError::MissingField("city"));
        }
        if state.is_empty() {
            return Err(ValidationError::MissingField("state"));
        }

        let street = match self.street.trim() {
            "" => CURRENT_LOCATION.to_string(),
            s => s.to_string(),
        };

        Ok(Self {
            street,
            city,
            state,
            snapshot: self.snapshot,
        })
    }
}

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] PersistenceConflictError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl FavoriteError {
    pub fn duplicate(city: &str, state: &str) -> Self {
        Self::Conflict(PersistenceConflictError::DuplicateLocation {
            city: city.to_string(),
            state: state.to_string(),
        })
    }
}

impl From<FavoriteError> for AppError {
    fn from(e: FavoriteError) -> Self {
        match e {
            FavoriteError::Validation(e) => AppError::Validation(e),
            FavoriteError::Conflict(e) => AppError::PersistenceConflict(e),
            FavoriteError::Database(e) => AppError::Database(e),
        }
    }
}

pub type FavoriteResult<T> = Result<T, FavoriteError>;

/// Storage for favorite locations.
///
/// At most one record exists per exact `(city, state)` pair; `insert` must
/// check and write atomically. Implementations need not be `Sync`, the
/// `FavoriteClient` wrapper serializes access.
pub trait FavoriteStore: Send {
    /// Exact, case-sensitive lookup.
    fn find(&self, city: &str, state: &str) -> FavoriteResult<Option<FavoriteLocation>>;

    fn get(&self, id: &str) -> FavoriteResult<Option<FavoriteLocation>>;

    /// All favorites, newest first.
    fn list(&self) -> FavoriteResult<Vec<FavoriteLocation>>;

    /// # Errors
    /// `FavoriteError::Validation` for blank city/state, `FavoriteError::Conflict`
    /// when the location is already saved.
    fn insert(&self, favorite: NewFavorite) -> FavoriteResult<FavoriteLocation>;

    /// Returns whether a record was removed.
    fn delete_by_id(&self, id: &str) -> FavoriteResult<bool>;

    fn count(&self) -> FavoriteResult<usize>;

    fn contains(&self, city: &str, state: &str) -> FavoriteResult<bool> {
        Ok(self.find(city, state)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_city_rejected() {
        let err = NewFavorite::new("1 Main St", "  ", "Texas")
            .normalized()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("city"));
    }

    #[test]
    fn test_blank_state_rejected() {
        let err = NewFavorite::new("1 Main St", "Austin", "")
            .normalized()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("state"));
    }

    #[test]
    fn test_blank_street_defaults_to_current_location() {
        let fav = NewFavorite::new("", " Austin ", "Texas").normalized().unwrap();
        assert_eq!(fav.street, CURRENT_LOCATION);
        assert_eq!(fav.city, "Austin");
    }

    #[test]
    fn test_conflict_maps_to_distinct_app_error() {
        let err: AppError = FavoriteError::duplicate("Austin", "Texas").into();
        assert!(matches!(err, AppError::PersistenceConflict(_)));
        assert_eq!(
            err.user_message(),
            "This location is already in your favorites."
        );
    }
}
