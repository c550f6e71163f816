//! Async forecast fetching.
//! All network work runs off the UI thread; results come back over mpsc.

use std::sync::mpsc;
use std::sync::Arc;

use skycast_core::AppError;
use skycast_weather::{DailyMode, ForecastResult, ForecastService, LocationQuery};

use crate::chart::ChartSink;
use crate::coordinator::ViewCoordinator;
use crate::error::ViewError;
use crate::map::MapSink;
use crate::request::RequestId;

/// Result of one forecast request, tagged with the id it was issued under.
#[derive(Debug)]
pub struct FetchDone {
    pub id: RequestId,
    pub result: Result<ForecastResult, AppError>,
}

/// Fetch a forecast on `runtime` and send `FetchDone` on `tx` when complete.
pub fn request_fetch(
    tx: &mpsc::Sender<FetchDone>,
    runtime: &tokio::runtime::Handle,
    service: Arc<ForecastService>,
    query: LocationQuery,
    id: RequestId,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = service.forecast(&query, DailyMode::Lenient).await;
        if let Err(e) = &result {
            tracing::debug!("Forecast request {} failed: {}", id, e);
        }
        if tx.send(FetchDone { id, result }).is_err() {
            tracing::debug!("Dropping forecast response {}; receiver gone", id);
        }
    });
}

impl<C: ChartSink, M: MapSink> ViewCoordinator<C, M> {
    /// Submit `query` and start fetching it.
    pub fn submit_query(
        &mut self,
        tx: &mpsc::Sender<FetchDone>,
        runtime: &tokio::runtime::Handle,
        service: Arc<ForecastService>,
        query: LocationQuery,
    ) -> RequestId {
        let id = self.submit();
        request_fetch(tx, runtime, service, query, id);
        id
    }

    /// Apply every finished fetch waiting on `rx` without blocking.
    ///
    /// Returns how many results were applied (stale ones are not counted).
    ///
    /// # Errors
    /// Returns the first `ViewError` raised while applying a result.
    pub fn poll_fetches(&mut self, rx: &mpsc::Receiver<FetchDone>) -> Result<usize, ViewError> {
        let mut applied = 0;
        while let Ok(done) = rx.try_recv() {
            if self.complete(done.id, done.result)? {
                applied += 1;
            }
        }
        Ok(applied)
    }
}
