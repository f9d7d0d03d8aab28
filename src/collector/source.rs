//! Per-source polling loop.
//!
//! ```text
//! WAIT_TICK -> ACQUIRE_SLOT -> RUNNING -> RELEASE_SLOT -> WAIT_TICK
//!     |             |             |
//!     +-------------+-------------+--> CANCELED
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::collector::admission::AdmissionPool;
use crate::collector::{CollectorError, Fetcher, Sender, SourceId};
use crate::log::Logger;
use crate::{log_debug, log_error, log_info};

/// One source's polling task. Owns nothing shared except the pool and the
/// capabilities, all behind `Arc`.
pub(crate) struct SourceLoop {
    pub(crate) id: SourceId,
    pub(crate) interval: Duration,
    pub(crate) pool: Arc<AdmissionPool>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) sender: Arc<dyn Sender>,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) errors: mpsc::Sender<CollectorError>,
}

impl SourceLoop {
    /// Poll until `shutdown` fires.
    pub(crate) async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log_debug!(
            self.logger,
            "Source {} polling every {:?}",
            self.id,
            self.interval
        );

        loop {
            // WAIT_TICK
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            // ACQUIRE_SLOT
            let Some(permit) = self.pool.acquire(&shutdown).await else {
                break;
            };

            // RUNNING
            let outcome = self.run_cycle(&shutdown).await;

            // RELEASE_SLOT
            drop(permit);

            match outcome {
                Ok(()) => {}
                Err(CollectorError::Cancelled) => break,
                Err(err) => self.report(err).await,
            }
        }

        log_debug!(self.logger, "Source {} stopped", self.id);
    }

    /// One fetch-then-send cycle. Fetch failure short-circuits the send.
    async fn run_cycle(&self, shutdown: &CancellationToken) -> Result<(), CollectorError> {
        let source_id = self.id;

        let payload = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(CollectorError::Cancelled),
            result = self.fetcher.fetch(source_id) => {
                result.map_err(|error| CollectorError::Fetch { source_id, error })?
            }
        };
        let size = payload.len();

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(CollectorError::Cancelled),
            result = self.sender.send(payload) => {
                result.map_err(|error| CollectorError::Send { source_id, error })?
            }
        }

        log_info!(
            self.logger,
            "Successfully processed payload from source {} ({} bytes)",
            source_id,
            size
        );
        Ok(())
    }

    /// Hand a cycle failure to the collector's error drain.
    async fn report(&self, err: CollectorError) {
        // The drain runs until every loop has exited, so this only fails if
        // the drain task itself died.
        if let Err(mpsc::error::SendError(err)) = self.errors.send(err).await {
            log_error!(self.logger, "Source {} error: {}", self.id, err);
        }
    }
}
