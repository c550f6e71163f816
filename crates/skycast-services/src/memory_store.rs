//! In-memory favorite storage for tests and ephemeral sessions.

use chrono::Utc;
use parking_lot::Mutex;

use crate::favorite::{FavoriteError, FavoriteLocation, FavoriteResult, FavoriteStore, NewFavorite};

#[derive(Debug, Default)]
pub struct MemoryFavoriteStore {
    // Insertion order; newest last.
    records: Mutex<Vec<FavoriteLocation>>,
}

impl MemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoriteStore for MemoryFavoriteStore {
    fn find(&self, city: &str, state: &str) -> FavoriteResult<Option<FavoriteLocation>> {
        Ok(self
            .records
            .lock()
            .iter()
            .find(|f| f.city == city && f.state == state)
            .cloned())
    }

    fn get(&self, id: &str) -> FavoriteResult<Option<FavoriteLocation>> {
        Ok(self.records.lock().iter().find(|f| f.id == id).cloned())
    }

    fn list(&self) -> FavoriteResult<Vec<FavoriteLocation>> {
        Ok(self.records.lock().iter().rev().cloned().collect())
    }

    fn insert(&self, favorite: NewFavorite) -> FavoriteResult<FavoriteLocation> {
        let favorite = favorite.normalized()?;
        let mut records = self.records.lock();

        if records
            .iter()
            .any(|f| f.city == favorite.city && f.state == favorite.state)
        {
            return Err(FavoriteError::duplicate(&favorite.city, &favorite.state));
        }

        let record = FavoriteLocation {
            id: uuid::Uuid::new_v4().to_string(),
            street: favorite.street,
            city: favorite.city,
            state: favorite.state,
            snapshot: favorite.snapshot,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    fn delete_by_id(&self, id: &str) -> FavoriteResult<bool> {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|f| f.id != id);
        Ok(records.len() < before)
    }

    fn count(&self) -> FavoriteResult<usize> {
        Ok(self.records.lock().len())
    }
}
