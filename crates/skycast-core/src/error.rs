//! Centralized error types for Skycast.
//!
//! The forecast pipeline distinguishes four failure classes:
//! - `ValidationError`: structurally malformed input (missing `startTime`/`values`)
//! - `AssemblyError`: nothing usable survived aggregation
//! - `UpstreamError`: weather provider, geocoder or widget collaborator failed
//! - `PersistenceConflictError`: a favorite already exists for the location
//!
//! Field-level problems (NaN, missing numbers, bad sunrise strings) never
//! surface here; the coercer replaces them with defaults.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Conflict: {0}")]
    PersistenceConflict(#[from] PersistenceConflictError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Validation(e) => e.user_message(),
            AppError::Assembly(e) => e.user_message(),
            AppError::Upstream(e) => e.user_message(),
            AppError::PersistenceConflict(e) => e.user_message(),
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Structural problems in raw provider data or user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Interval {index} has no startTime")]
    MissingStartTime { index: usize },

    #[error("Interval {index} has an unparseable startTime: {value}")]
    InvalidStartTime { index: usize, value: String },

    #[error("Interval {index} has no values")]
    MissingValues { index: usize },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid location query: {0}")]
    InvalidQuery(String),
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingStartTime { .. }
            | ValidationError::InvalidStartTime { .. }
            | ValidationError::MissingValues { .. } => {
                "The weather service returned incomplete data. Please try again."
            }
            ValidationError::MissingField("street") => "Street, city and state are required.",
            ValidationError::MissingField(_) => "City and state are required.",
            ValidationError::InvalidQuery(_) => "Please enter a valid address or enable auto-detect.",
        }
    }
}

/// The pipeline produced nothing that can be shown as a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("No valid daily forecast data")]
    NoDailyData,

    #[error("No valid hourly forecast data")]
    NoHourlyData,
}

impl AssemblyError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AssemblyError::NoDailyData => "No forecast is available for this location.",
            AssemblyError::NoHourlyData => "No hourly forecast is available for this location.",
        }
    }
}

/// Failures of external collaborators. Attempts are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    #[error("{provider} returned {status}: {detail}")]
    Provider {
        provider: String,
        status: u16,
        detail: String,
    },

    #[error("{0} request timed out")]
    Timeout(String),

    #[error("Connection to {provider} failed: {message}")]
    Connection { provider: String, message: String },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("Missing required timeline: {0}")]
    MissingTimeline(String),

    #[error("{collaborator} was not ready after {waited_ms}ms")]
    ReadinessTimeout { collaborator: String, waited_ms: u64 },
}

impl UpstreamError {
    pub fn user_message(&self) -> &'static str {
        match self {
            UpstreamError::Geocoding(_) => "Address not found. Check and try again.",
            UpstreamError::Provider { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            UpstreamError::Provider { .. } => "Weather service error. Please try again.",
            UpstreamError::Timeout(_) => "The request timed out. Please try again.",
            UpstreamError::Connection { .. } => {
                "Unable to connect. Check your internet connection."
            }
            UpstreamError::InvalidResponse { .. } | UpstreamError::MissingTimeline(_) => {
                "Received an unexpected response from the weather service."
            }
            UpstreamError::ReadinessTimeout { .. } => "The map failed to load. Please try again.",
        }
    }
}

/// A favorite already exists for the requested location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceConflictError {
    #[error("Location already in favorites: {city}, {state}")]
    DuplicateLocation { city: String, state: String },
}

impl PersistenceConflictError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PersistenceConflictError::DuplicateLocation { .. } => {
                "This location is already in your favorites."
            }
        }
    }
}

/// Database/storage errors (SQLite, local state).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),

    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to access saved favorites. Try restarting the app."
            }
            DatabaseError::QueryFailed(_) | DatabaseError::TaskFailed(_) => {
                "A favorites operation failed. Please try again."
            }
            DatabaseError::Corruption(_) => {
                "Saved favorites may be corrupted. Consider resetting app data."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration location not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "No configuration directory is available on this system.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Io(_) => "Unable to read or save configuration. Check file permissions.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_upstream_error(self, provider: &str) -> UpstreamError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_upstream_error(self, provider: &str) -> UpstreamError {
        if self.is_timeout() {
            UpstreamError::Timeout(provider.to_string())
        } else if self.is_decode() {
            UpstreamError::InvalidResponse {
                provider: provider.to_string(),
                message: self.to_string(),
            }
        } else if let Some(status) = self.status() {
            UpstreamError::Provider {
                provider: provider.to_string(),
                status: status.as_u16(),
                detail: self.to_string(),
            }
        } else {
            UpstreamError::Connection {
                provider: provider.to_string(),
                message: self.to_string(),
            }
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;

    /// True for UNIQUE/PRIMARY KEY constraint failures.
    fn is_constraint_violation(&self) -> bool;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }

    fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
