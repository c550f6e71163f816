use chrono::NaiveDate;
use thiserror::Error;

use skycast_core::UpstreamError;

/// Errors from view transitions and rendering collaborators.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The chart sink still reports a live instance after teardown. This is
    /// a lifecycle defect in the sink, never a transient condition.
    #[error("Chart instance still live after teardown")]
    LiveChart,

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("No forecast loaded")]
    NotLoaded,

    #[error("No forecast for {0}")]
    UnknownDate(NaiveDate),
}

impl ViewError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ViewError::LiveChart | ViewError::Render(_) => {
                "The chart could not be displayed. Please try again."
            }
            ViewError::Upstream(e) => e.user_message(),
            ViewError::NotLoaded => "Search for a location first.",
            ViewError::UnknownDate(_) => "No forecast is available for that day.",
        }
    }
}
