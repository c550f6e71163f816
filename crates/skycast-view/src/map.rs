//! Map collaborator gated by an explicit readiness signal.
//!
//! The widget resolves its [`ReadySignal`] once loaded. Callers wait on the
//! paired [`Readiness`] with a bounded timeout instead of polling.

use std::time::{Duration, Instant};

use tokio::sync::watch;

use skycast_core::{UpstreamError, ViewConfig};
use skycast_weather::Location;

use crate::error::ViewError;

const MAP_COLLABORATOR: &str = "map";

/// Rendering collaborator that shows a location marker.
pub trait MapSink: Send {
    /// Center the map on `location` with a marker.
    ///
    /// # Errors
    /// Returns an error if the widget rejects the update.
    fn center(&mut self, location: &Location) -> anyhow::Result<()>;

    /// Remove the marker and any map instance.
    fn clear(&mut self);
}

/// Resolved by the widget once it is usable.
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

impl ReadySignal {
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct Readiness {
    rx: watch::Receiver<bool>,
}

/// Create a linked signal/readiness pair, initially not ready.
pub fn readiness() -> (ReadySignal, Readiness) {
    let (tx, rx) = watch::channel(false);
    (ReadySignal { tx }, Readiness { rx })
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until ready, failing after `timeout`.
    ///
    /// # Errors
    /// Returns `UpstreamError::ReadinessTimeout` when the timeout elapses or
    /// the signal is dropped before becoming ready.
    pub async fn wait(&self, collaborator: &str, timeout: Duration) -> Result<(), UpstreamError> {
        let mut rx = self.rx.clone();
        let started = Instant::now();

        let outcome = tokio::time::timeout(timeout, rx.wait_for(|ready| *ready))
            .await
            .map(|ready| ready.map(|_| ()));

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) | Err(_) => {
                let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                tracing::warn!("{} not ready after {}ms", collaborator, waited_ms);
                Err(UpstreamError::ReadinessTimeout {
                    collaborator: collaborator.to_string(),
                    waited_ms,
                })
            }
        }
    }
}

#[derive(Debug)]
pub struct MapHost<M> {
    sink: M,
    readiness: Readiness,
    timeout: Duration,
    centered: Option<Location>,
}

impl<M: MapSink> MapHost<M> {
    pub fn new(sink: M, readiness: Readiness, config: &ViewConfig) -> Self {
        Self {
            sink,
            readiness,
            timeout: Duration::from_millis(config.map_ready_timeout_ms),
            centered: None,
        }
    }

    pub fn centered(&self) -> Option<&Location> {
        self.centered.as_ref()
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    /// Wait for the widget, then center it on `location`.
    ///
    /// # Errors
    /// `ViewError::Upstream` on readiness timeout, `ViewError::Render` if the
    /// widget rejects the update.
    pub async fn recenter(&mut self, location: &Location) -> Result<(), ViewError> {
        self.readiness.wait(MAP_COLLABORATOR, self.timeout).await?;
        self.sink
            .center(location)
            .map_err(|e| ViewError::Render(e.to_string()))?;
        self.centered = Some(location.clone());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.sink.clear();
        self.centered = None;
    }
}
