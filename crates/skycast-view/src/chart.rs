//! Chart lifecycle: at most one live chart instance per mount point.

use serde::{Deserialize, Serialize};

use skycast_weather::ForecastResult;

use crate::error::ViewError;

/// Which chart is shown below the forecast table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    /// Daily table
    #[default]
    Day,
    /// Daily min/max temperature range
    Temp,
    /// Hourly temperature, humidity, pressure and wind
    Meteogram,
}

/// Rendering collaborator that draws charts from a forecast.
pub trait ChartSink: Send {
    /// Build a chart instance for `view`.
    ///
    /// # Errors
    /// Returns an error if the chart cannot be drawn.
    fn create(&mut self, view: ChartView, forecast: &ForecastResult) -> anyhow::Result<()>;

    /// Destroy the current instance, if any.
    fn destroy(&mut self);

    /// Whether an instance currently exists on the mount point.
    fn is_live(&self) -> bool;
}

/// Enforces destroy-before-create around a [`ChartSink`].
#[derive(Debug)]
pub struct ChartHost<C> {
    sink: C,
    mounted: Option<ChartView>,
}

impl<C: ChartSink> ChartHost<C> {
    pub fn new(sink: C) -> Self {
        Self {
            sink,
            mounted: None,
        }
    }

    pub fn mounted(&self) -> Option<ChartView> {
        self.mounted
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    /// Replace whatever is mounted with a chart for `view`.
    ///
    /// # Errors
    /// `ViewError::LiveChart` if the previous instance survives teardown,
    /// `ViewError::Render` if the sink fails to draw.
    pub fn mount(&mut self, view: ChartView, forecast: &ForecastResult) -> Result<(), ViewError> {
        self.teardown();

        if self.sink.is_live() {
            tracing::error!("Chart still live after teardown; refusing to mount {:?}", view);
            return Err(ViewError::LiveChart);
        }

        self.sink
            .create(view, forecast)
            .map_err(|e| ViewError::Render(e.to_string()))?;
        self.mounted = Some(view);
        tracing::debug!("Mounted {:?} chart", view);
        Ok(())
    }

    pub fn teardown(&mut self) {
        if self.mounted.is_some() || self.sink.is_live() {
            self.sink.destroy();
        }
        self.mounted = None;
    }
}
