//! Async favorites client over any [`FavoriteStore`].

use std::sync::Arc;

use parking_lot::Mutex;

use skycast_core::{AppError, DatabaseError, FavoritesConfig};
use skycast_weather::{FavoriteIndex, ForecastService, Location};

use crate::favorite::{
    FavoriteError, FavoriteLocation, FavoriteResult, FavoriteStore, NewFavorite,
};
use crate::favorite_store::SqliteFavoriteStore;
use crate::memory_store::MemoryFavoriteStore;

/// Shared handle to a favorites store.
///
/// Store calls run on the blocking pool; the mutex serializes them so each
/// operation sees a consistent store.
#[derive(Clone)]
pub struct FavoriteClient {
    store: Arc<Mutex<dyn FavoriteStore>>,
}

impl FavoriteClient {
    pub fn new<S: FavoriteStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Open the SQLite store named in `config`.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub fn open(config: &FavoritesConfig) -> Result<Self, DatabaseError> {
        Ok(Self::new(SqliteFavoriteStore::new(&config.db_path)?))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryFavoriteStore::new())
    }

    async fn run<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn FavoriteStore) -> FavoriteResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || op(&*store.lock()))
            .await
            .map_err(|e| DatabaseError::TaskFailed(e.to_string()))?;
        Ok(result?)
    }

    /// # Errors
    /// Returns `AppError::Database` if the store cannot be read.
    pub async fn find(&self, city: &str, state: &str) -> Result<Option<FavoriteLocation>, AppError> {
        let city = city.to_string();
        let state = state.to_string();
        self.run(move |s| s.find(&city, &state)).await
    }

    /// # Errors
    /// Returns `AppError::Database` if the store cannot be read.
    pub async fn get(&self, id: &str) -> Result<Option<FavoriteLocation>, AppError> {
        let id = id.to_string();
        self.run(move |s| s.get(&id)).await
    }

    /// Newest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the store cannot be read.
    pub async fn list(&self) -> Result<Vec<FavoriteLocation>, AppError> {
        self.run(|s| s.list()).await
    }

    /// # Errors
    /// `AppError::PersistenceConflict` when the location is already saved,
    /// `AppError::Validation` for blank city or state.
    pub async fn add(&self, favorite: NewFavorite) -> Result<FavoriteLocation, AppError> {
        self.run(move |s| s.insert(favorite)).await
    }

    /// Save `location` with a freshly fetched, strictly validated snapshot.
    ///
    /// An existing favorite is reported before any provider call is made.
    ///
    /// # Errors
    /// `AppError::PersistenceConflict` for a saved location, otherwise any
    /// error from [`ForecastService::favorite_snapshot`] or the store.
    pub async fn add_from_forecast(
        &self,
        service: &ForecastService,
        location: &Location,
    ) -> Result<FavoriteLocation, AppError> {
        if self.find(&location.city, &location.state).await?.is_some() {
            return Err(FavoriteError::duplicate(&location.city, &location.state).into());
        }

        let snapshot = service.favorite_snapshot(location).await?;
        self.add(
            NewFavorite::new(&location.street, &location.city, &location.state)
                .with_snapshot(snapshot),
        )
        .await
    }

    /// Returns whether a favorite was removed.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the store cannot be written.
    pub async fn remove(&self, id: &str) -> Result<bool, AppError> {
        let id = id.to_string();
        self.run(move |s| s.delete_by_id(&id)).await
    }

    /// # Errors
    /// Returns `AppError::Database` if the store cannot be read.
    pub async fn count(&self) -> Result<usize, AppError> {
        self.run(|s| s.count()).await
    }
}

impl FavoriteIndex for FavoriteClient {
    fn favorite_id(&self, city: &str, state: &str) -> Result<Option<String>, DatabaseError> {
        match self.store.lock().find(city, state) {
            Ok(found) => Ok(found.map(|f| f.id)),
            Err(FavoriteError::Database(e)) => Err(e),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }
}

impl std::fmt::Debug for FavoriteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FavoriteClient").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::PersistenceConflictError;

    fn sqlite_client() -> FavoriteClient {
        FavoriteClient::new(SqliteFavoriteStore::in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_add_and_find() {
        let client = sqlite_client();
        let saved = client
            .add(NewFavorite::new("100 Congress Ave", "Austin", "Texas"))
            .await
            .unwrap();

        let found = client.find("Austin", "Texas").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert_eq!(found.street, "100 Congress Ave");
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let client = sqlite_client();
        client.add(NewFavorite::new("", "Austin", "Texas")).await.unwrap();

        let err = client
            .add(NewFavorite::new("", "Austin", "Texas"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::PersistenceConflict(PersistenceConflictError::DuplicateLocation { .. })
        ));
        assert_eq!(client.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let client = FavoriteClient::in_memory();
        let saved = client.add(NewFavorite::new("", "Austin", "Texas")).await.unwrap();

        assert!(client.remove(&saved.id).await.unwrap());
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favorite_index_lookup() {
        let client = sqlite_client();
        let saved = client.add(NewFavorite::new("", "Austin", "Texas")).await.unwrap();

        assert_eq!(
            client.favorite_id("Austin", "Texas").unwrap(),
            Some(saved.id)
        );
        assert_eq!(client.favorite_id("Austin", "TX").unwrap(), None);
    }
}
