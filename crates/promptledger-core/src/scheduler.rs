//! Fixed-interval driver for the ingestion pipeline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::pipeline::IngestionPipeline;

/// Default time between cycles.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Runs the pipeline once immediately and then every period.
///
/// Each firing is its own task. A slow cycle never delays or suppresses the
/// next tick, so cycles may overlap.
#[derive(Debug)]
pub struct Scheduler {
    pipeline: Arc<IngestionPipeline>,
    period: Duration,
}

impl Scheduler {
    /// Creates a scheduler.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `period` is zero.
    pub fn new(pipeline: Arc<IngestionPipeline>, period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::Config("poll period must be greater than zero".into()));
        }
        Ok(Self { pipeline, period })
    }

    /// Time between cycles.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Fires cycles until `shutdown` resolves, then waits for running cycles.
    ///
    /// Returns the number of cycles started.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles = JoinSet::new();
        let mut fired = 0u64;
        tokio::pin!(shutdown);

        info!(period_secs = self.period.as_secs(), "Scheduler started");

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => break,

                _ = ticker.tick() => {
                    fired += 1;
                    if !cycles.is_empty() {
                        warn!(
                            in_flight = cycles.len(),
                            "Previous cycle still running, starting another"
                        );
                    }
                    let pipeline = Arc::clone(&self.pipeline);
                    cycles.spawn(async move { pipeline.run_cycle().await });
                }

                Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                    if let Err(e) = joined {
                        error!("Ingestion cycle panicked: {e}");
                    }
                }
            }
        }

        if !cycles.is_empty() {
            info!(in_flight = cycles.len(), "Waiting for running cycles to finish");
        }
        while let Some(joined) = cycles.join_next().await {
            if let Err(e) = joined {
                error!("Ingestion cycle panicked: {e}");
            }
        }

        info!(cycles = fired, "Scheduler stopped");
        fired
    }
}
