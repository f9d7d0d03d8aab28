//! Collector: spawns the source loops and owns their lifecycle.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::collector::admission::AdmissionPool;
use crate::collector::source::SourceLoop;
use crate::collector::{CollectorConfig, CollectorError, Fetcher, Sender, SourceId};
use crate::log::Logger;
use crate::{log_error, log_info, log_warn};

/// Orchestrates one polling loop per source under a shared admission bound.
pub struct Collector {
    config: CollectorConfig,
    pool: Arc<AdmissionPool>,
    fetcher: Arc<dyn Fetcher>,
    sender: Arc<dyn Sender>,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl Collector {
    /// Create a collector.
    ///
    /// Defaults are applied here, once: a zero `max_concurrent` becomes
    /// `source_count` and a zero `poll_interval` becomes 5 seconds.
    ///
    /// # Errors
    /// Returns `CollectorError::Config` if `source_count` is zero or does not
    /// fit a source id.
    pub fn new(
        config: CollectorConfig,
        fetcher: Arc<dyn Fetcher>,
        sender: Arc<dyn Sender>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, CollectorError> {
        if config.source_count == 0 {
            return Err(CollectorError::Config(
                "source_count must be at least 1".to_string(),
            ));
        }
        if u32::try_from(config.source_count).is_err() {
            return Err(CollectorError::Config(format!(
                "source_count {} is out of range",
                config.source_count
            )));
        }

        let config = config.with_defaults_applied();
        let pool = Arc::new(AdmissionPool::new(config.max_concurrent));

        Ok(Self {
            config,
            pool,
            fetcher,
            sender,
            logger,
        })
    }

    /// Effective configuration, with defaults applied.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// The admission pool shared by all source loops.
    pub fn pool(&self) -> &Arc<AdmissionPool> {
        &self.pool
    }

    /// Run every source loop until `shutdown` is cancelled.
    ///
    /// Returns once cancellation has been observed, every source loop has
    /// exited and every queued error has been logged. The result says
    /// nothing about individual cycles; those only show up in the log.
    pub async fn start(&self, shutdown: CancellationToken) -> Result<(), CollectorError> {
        let source_count = self.config.source_count;
        let (errors_tx, errors_rx) = mpsc::channel(source_count);

        let drain = tokio::spawn(drain_errors(errors_rx, Arc::clone(&self.logger)));

        let mut loops = JoinSet::new();
        for id in (1..=source_count).filter_map(|n| u32::try_from(n).ok().and_then(SourceId::new)) {
            let source = SourceLoop {
                id,
                interval: self.config.poll_interval,
                pool: Arc::clone(&self.pool),
                fetcher: Arc::clone(&self.fetcher),
                sender: Arc::clone(&self.sender),
                logger: Arc::clone(&self.logger),
                errors: errors_tx.clone(),
            };
            loops.spawn(source.run(shutdown.clone()));
        }
        // Loops hold the only remaining senders; the drain ends when they do.
        drop(errors_tx);

        log_info!(
            self.logger,
            "Collector started: {} sources, at most {} concurrent, polling every {:?}",
            source_count,
            self.pool.capacity(),
            self.config.poll_interval
        );

        shutdown.cancelled().await;
        log_info!(self.logger, "Collector context canceled; shutting down.");

        while let Some(joined) = loops.join_next().await {
            if let Err(e) = joined {
                log_error!(self.logger, "Source loop task failed: {}", e);
            }
        }

        if let Err(e) = drain.await {
            log_error!(self.logger, "Error drain task failed: {}", e);
        }

        if self.pool.in_flight() != 0 {
            log_warn!(
                self.logger,
                "{} admission slots still held after shutdown",
                self.pool.in_flight()
            );
        }
        log_info!(self.logger, "Collector stopped");
        Ok(())
    }
}

/// Log every error pushed by the source loops until all of them are gone.
async fn drain_errors(mut errors: mpsc::Receiver<CollectorError>, logger: Arc<dyn Logger>) {
    while let Some(err) = errors.recv().await {
        if err.is_protocol() {
            log_error!(logger, "Collector caught protocol error: {}", err);
        } else {
            log_error!(logger, "Collector caught error: {}", err);
        }
    }
}
