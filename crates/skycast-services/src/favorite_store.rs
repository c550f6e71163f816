//! SQLite-based favorite storage.
//!
//! `(city, state)` uniqueness is enforced by a UNIQUE constraint, so
//! insert-if-absent is a single statement and needs no read-then-write.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use skycast_core::{DatabaseError, RusqliteErrorExt};
use skycast_weather::DailyForecast;

use crate::favorite::{FavoriteError, FavoriteLocation, FavoriteResult, FavoriteStore, NewFavorite};

const COLUMNS: &str = "id, street, city, state, snapshot, created_at";

pub struct SqliteFavoriteStore {
    conn: Connection,
}

impl SqliteFavoriteStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the file cannot be opened or the schema
    /// cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| e.into_database_error())?;
        let store = Self { conn };
        store.init_schema()?;
        tracing::info!("Opened favorites store at {}", path.display());
        Ok(store)
    }

    /// # Errors
    /// Returns `DatabaseError` if the schema cannot be created.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| e.into_database_error())?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS favorites (
                    id TEXT PRIMARY KEY,
                    street TEXT NOT NULL,
                    city TEXT NOT NULL,
                    state TEXT NOT NULL,
                    snapshot TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL,
                    UNIQUE (city, state)
                );

                CREATE INDEX IF NOT EXISTS idx_favorites_created ON favorites(created_at DESC);
                "#,
            )
            .map_err(|e| e.into_database_error())
    }

    fn row_to_favorite(row: &rusqlite::Row) -> rusqlite::Result<FavoriteLocation> {
        let snapshot_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;

        let snapshot: Vec<DailyForecast> = serde_json::from_str(&snapshot_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(FavoriteLocation {
            id: row.get(0)?,
            street: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
            snapshot,
            created_at,
        })
    }
}

fn db_err(e: rusqlite::Error) -> FavoriteError {
    FavoriteError::Database(e.into_database_error())
}

impl FavoriteStore for SqliteFavoriteStore {
    fn find(&self, city: &str, state: &str) -> FavoriteResult<Option<FavoriteLocation>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM favorites WHERE city = ?1 AND state = ?2",
                    COLUMNS
                ),
                params![city, state],
                Self::row_to_favorite,
            )
            .optional()
            .map_err(db_err)
    }

    fn get(&self, id: &str) -> FavoriteResult<Option<FavoriteLocation>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM favorites WHERE id = ?1", COLUMNS),
                params![id],
                Self::row_to_favorite,
            )
            .optional()
            .map_err(db_err)
    }

    fn list(&self) -> FavoriteResult<Vec<FavoriteLocation>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM favorites ORDER BY created_at DESC, rowid DESC",
                COLUMNS
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], Self::row_to_favorite)
            .map_err(db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    fn insert(&self, favorite: NewFavorite) -> FavoriteResult<FavoriteLocation> {
        let favorite = favorite.normalized()?;
        let snapshot = serde_json::to_string(&favorite.snapshot)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let record = FavoriteLocation {
            id: uuid::Uuid::new_v4().to_string(),
            street: favorite.street,
            city: favorite.city,
            state: favorite.state,
            snapshot: favorite.snapshot,
            created_at: Utc::now(),
        };

        let inserted = self.conn.execute(
            "INSERT INTO favorites (id, street, city, state, snapshot, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.street,
                record.city,
                record.state,
                snapshot,
                record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        );

        match inserted {
            Ok(_) => {
                tracing::info!("Saved favorite {}, {}", record.city, record.state);
                Ok(record)
            }
            Err(e) if e.is_constraint_violation() => {
                tracing::debug!("Favorite {}, {} already exists", record.city, record.state);
                Err(FavoriteError::duplicate(&record.city, &record.state))
            }
            Err(e) => Err(db_err(e)),
        }
    }

    fn delete_by_id(&self, id: &str) -> FavoriteResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM favorites WHERE id = ?1", params![id])
            .map_err(db_err)?;
        Ok(removed > 0)
    }

    fn count(&self) -> FavoriteResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM favorites", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
