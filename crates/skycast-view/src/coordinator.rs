//! View-state coordinator.
//!
//! Single owner of the current [`ForecastResult`] and everything derived from
//! it on screen. All mutations go through the named transitions below.
//!
//! ```text
//! Idle ──submit──▶ Loading ──complete(Ok)──▶ Loaded ──select_day / switch_view──▶ Loaded
//!                     │                         │
//!                     └──complete(Err)──▶ Error └──clear──▶ Idle
//! ```

use chrono::NaiveDate;

use skycast_core::AppError;
use skycast_weather::{ForecastResult, CURRENT_LOCATION};

use crate::chart::{ChartHost, ChartSink, ChartView};
use crate::error::ViewError;
use crate::map::{MapHost, MapSink};
use crate::request::{RequestId, RequestSequencer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading(RequestId),
    Loaded,
    /// User-facing message of the failure
    Error(String),
}

pub struct ViewCoordinator<C, M> {
    state: ViewState,
    current: Option<ForecastResult>,
    selected_date: Option<NaiveDate>,
    details_visible: bool,
    chart_view: ChartView,
    sequencer: RequestSequencer,
    charts: ChartHost<C>,
    map: MapHost<M>,
}

impl<C: ChartSink, M: MapSink> ViewCoordinator<C, M> {
    pub fn new(charts: ChartHost<C>, map: MapHost<M>) -> Self {
        Self {
            state: ViewState::Idle,
            current: None,
            selected_date: None,
            details_visible: false,
            chart_view: ChartView::default(),
            sequencer: RequestSequencer::new(),
            charts,
            map,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn current(&self) -> Option<&ForecastResult> {
        self.current.as_ref()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn details_visible(&self) -> bool {
        self.details_visible
    }

    pub fn chart_view(&self) -> ChartView {
        self.chart_view
    }

    pub fn charts(&self) -> &ChartHost<C> {
        &self.charts
    }

    pub fn map(&self) -> &MapHost<M> {
        &self.map
    }

    /// Start a new forecast request. Any in-flight request becomes stale.
    pub fn submit(&mut self) -> RequestId {
        let id = self.sequencer.next_id();
        tracing::debug!("Submitting forecast request {}", id);
        self.state = ViewState::Loading(id);
        id
    }

    /// Apply a finished request.
    ///
    /// Returns `Ok(false)` when `id` has been superseded by a newer submit or
    /// a `clear`, in which case the result is discarded.
    ///
    /// # Errors
    /// Returns `ViewError` if the chart for the new result cannot be mounted.
    pub fn complete(
        &mut self,
        id: RequestId,
        result: Result<ForecastResult, AppError>,
    ) -> Result<bool, ViewError> {
        if !self.sequencer.is_current(id) || self.state != ViewState::Loading(id) {
            tracing::debug!("Discarding superseded forecast response {}", id);
            return Ok(false);
        }

        match result {
            Ok(forecast) => {
                self.charts.teardown();
                self.map.clear();
                self.selected_date = None;
                self.details_visible = false;
                self.chart_view = ChartView::default();

                let forecast = self.current.insert(forecast);
                self.state = ViewState::Loaded;
                tracing::info!(
                    "Loaded forecast for {}, {} ({} days)",
                    forecast.location.city,
                    forecast.location.state,
                    forecast.daily.len()
                );
                self.charts.mount(self.chart_view, forecast)?;
            }
            Err(e) => {
                tracing::warn!("Forecast request {} failed: {}", id, e);
                self.discard_result();
                self.state = ViewState::Error(e.user_message().to_string());
            }
        }
        Ok(true)
    }

    /// Show details for one day and recenter the map on the location.
    ///
    /// # Errors
    /// `ViewError::NotLoaded` / `ViewError::UnknownDate` for invalid
    /// selections, `ViewError::Upstream` if the map never becomes ready.
    pub async fn select_day(&mut self, date: NaiveDate) -> Result<(), ViewError> {
        let forecast = self.loaded()?;
        if forecast.day(date).is_none() {
            return Err(ViewError::UnknownDate(date));
        }
        let location = forecast.location.clone();

        self.selected_date = Some(date);
        self.details_visible = true;
        self.map.recenter(&location).await
    }

    /// Swap the chart below the table.
    ///
    /// # Errors
    /// `ViewError::NotLoaded` without a result, otherwise any mount failure.
    pub fn switch_view(&mut self, view: ChartView) -> Result<(), ViewError> {
        let forecast = match (&self.state, &self.current) {
            (ViewState::Loaded, Some(forecast)) => forecast,
            _ => return Err(ViewError::NotLoaded),
        };
        self.chart_view = view;
        self.charts.mount(view, forecast)
    }

    /// Back to the summary; the result stays loaded.
    pub fn hide_details(&mut self) {
        self.details_visible = false;
    }

    /// Reset to `Idle`, dropping the result and all rendered instances.
    pub fn clear(&mut self) {
        self.discard_result();
        self.chart_view = ChartView::default();
        self.state = ViewState::Idle;
    }

    /// One-line share summary for `date`.
    ///
    /// # Errors
    /// `ViewError::NotLoaded` / `ViewError::UnknownDate`.
    pub fn share_text(&self, date: NaiveDate) -> Result<String, ViewError> {
        let forecast = self.loaded()?;
        let day = forecast.day(date).ok_or(ViewError::UnknownDate(date))?;

        // A zero reading falls through to the next field.
        let temperature = [day.apparent_temperature, day.temperature_max]
            .into_iter()
            .find(|t| *t != 0.0)
            .unwrap_or(day.temperature_min);

        Ok(format!(
            "The temperature in {} on {} is {}°F and the conditions are {}",
            share_location(forecast),
            date.format("%A, %b %-d, %Y"),
            temperature,
            day.condition().description()
        ))
    }

    /// Share text for the selected day, or the first day when none is selected.
    ///
    /// # Errors
    /// `ViewError::NotLoaded` when nothing is loaded.
    pub fn share_selected(&self) -> Result<String, ViewError> {
        let date = match self.selected_date {
            Some(date) => date,
            None => self
                .loaded()?
                .daily
                .first()
                .map(|d| d.date)
                .ok_or(ViewError::NotLoaded)?,
        };
        self.share_text(date)
    }

    fn loaded(&self) -> Result<&ForecastResult, ViewError> {
        match (&self.state, &self.current) {
            (ViewState::Loaded, Some(forecast)) => Ok(forecast),
            _ => Err(ViewError::NotLoaded),
        }
    }

    fn discard_result(&mut self) {
        self.charts.teardown();
        self.map.clear();
        self.current = None;
        self.selected_date = None;
        self.details_visible = false;
    }
}

fn share_location(forecast: &ForecastResult) -> String {
    let loc = &forecast.location;
    if loc.street == CURRENT_LOCATION {
        if loc.city.is_empty() || loc.state.is_empty() {
            CURRENT_LOCATION.to_string()
        } else {
            format!("{}, {}", loc.city, loc.state)
        }
    } else {
        format!("{}, {}, {}", loc.street, loc.city, loc.state)
    }
}
