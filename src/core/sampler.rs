//! Cancellable periodic sampling task.
//!
//! States are `idle` and `running`. A failing tick is logged and the
//! loop carries on; there is no failed state.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle to the running loop.
#[derive(Debug)]
struct RunningTask {
    token: CancellationToken,
    handle: JoinHandle<u64>,
    interval: Duration,
}

/// At most one periodic task per sampler.
#[derive(Debug, Default)]
pub struct Sampler {
    running: Option<RunningTask>,
}

impl Sampler {
    /// Create an idle sampler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Interval of the running task.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.running.as_ref().map(|r| r.interval)
    }

    /// Spawn a loop calling `tick` every `interval`.
    ///
    /// The first tick runs immediately. Cancellation is checked at the
    /// loop head and honored during the sleep, never inside a tick.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyTracking`] if a task is already running;
    /// the existing task is left alone.
    pub fn start<F, Fut>(&mut self, interval: Duration, mut tick: F) -> Result<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if self.running.is_some() {
            return Err(Error::AlreadyTracking);
        }

        let token = CancellationToken::new();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            info!("sampling started every {interval:?}");
            let mut ticks = 0u64;

            while !loop_token.is_cancelled() {
                if let Err(e) = tick().await {
                    warn!("sampling tick failed: {e}");
                }
                ticks += 1;

                tokio::select! {
                    () = loop_token.cancelled() => break,
                    () = tokio::time::sleep(interval) => {}
                }
            }

            info!("sampling stopped after {ticks} tick(s)");
            ticks
        });

        self.running = Some(RunningTask {
            token,
            handle,
            interval,
        });
        Ok(())
    }

    /// Cancel the loop and wait for it to wind down.
    ///
    /// A tick in flight is allowed to finish. Returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotTracking`] if no task is running.
    pub async fn stop(&mut self) -> Result<u64> {
        let running = self.running.take().ok_or(Error::NotTracking)?;
        running.token.cancel();

        match running.handle.await {
            Ok(ticks) => Ok(ticks),
            Err(e) => {
                // The tick panicked or the runtime is shutting down.
                debug!("sampling task ended abnormally: {e}");
                Ok(0)
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.token.cancel();
        }
    }
}
