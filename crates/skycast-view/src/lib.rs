//! Client-side view state for Skycast
//!
//! Holds the active forecast, the selected day and chart view, and keeps chart
//! and map collaborators in step with that state.

pub mod chart;
pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod map;
pub mod request;

pub use chart::{ChartHost, ChartSink, ChartView};
pub use coordinator::{ViewCoordinator, ViewState};
pub use error::ViewError;
pub use fetch::{request_fetch, FetchDone};
pub use map::{readiness, MapHost, MapSink, ReadySignal, Readiness};
pub use request::{RequestId, RequestSequencer};
