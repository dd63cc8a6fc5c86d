//! Background janitor that runs the sweeper at startup and then on a fixed
//! interval until shutdown.
//!
//! Each sweep runs on the blocking pool. An error or panic inside one sweep is
//! logged and the loop carries on with the next tick. The shutdown token is
//! checked before every sweep and while sleeping; a sweep already in progress
//! is allowed to finish.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::config::JanitorConfig;
use crate::core::metrics;
use crate::storage::sweeper::{SweepError, SweepReport, Sweeper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JanitorState {
    /// Waiting for the next tick
    Idle,
    /// A sweep is running
    Sweeping,
    /// The loop has exited after shutdown
    Stopped,
}

pub struct Janitor {
    sweeper: Arc<Sweeper>,
    interval: Duration,
}

impl Janitor {
    pub fn new(config: &JanitorConfig) -> Self {
        Self::with_sweeper(Sweeper::new(config), config.interval)
    }

    pub fn with_sweeper(sweeper: Sweeper, interval: Duration) -> Self {
        Self {
            sweeper: Arc::new(sweeper),
            interval,
        }
    }

    /// Start the janitor loop on the runtime.
    ///
    /// The first sweep starts immediately.
    pub fn spawn(self, shutdown: CancellationToken) -> JanitorHandle {
        let (state_tx, state_rx) = watch::channel(JanitorState::Idle);

        log::info!(
            "🧹 Janitor started for {} (interval: {}s)",
            self.sweeper.root().display(),
            self.interval.as_secs()
        );

        let task = tokio::spawn(self.run(shutdown.clone(), state_tx));

        JanitorHandle {
            shutdown,
            task,
            state: state_rx,
        }
    }

    async fn run(self, shutdown: CancellationToken, state_tx: watch::Sender<JanitorState>) {
        loop {
            if shutdown.is_cancelled() {
                break;
            }

            state_tx.send_replace(JanitorState::Sweeping);
            if let Err(e) = self.run_cycle().await {
                metrics::JANITOR_CYCLE_FAILURES_TOTAL.inc();
                log::error!("Janitor cycle failed, will retry next tick: {}", e);
            }
            state_tx.send_replace(JanitorState::Idle);

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        state_tx.send_replace(JanitorState::Stopped);
        log::info!("Janitor stopped");
    }

    /// Runs one sweep on the blocking pool, turning a panic into an error.
    pub async fn run_cycle(&self) -> Result<SweepReport, SweepError> {
        let sweeper = Arc::clone(&self.sweeper);
        tokio::task::spawn_blocking(move || sweeper.sweep())
            .await
            .map_err(|e| SweepError::Cycle(format!("sweep task did not complete: {}", e)))?
    }
}

/// Handle to a running janitor
pub struct JanitorHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
    state: watch::Receiver<JanitorState>,
}

impl JanitorHandle {
    pub fn state(&self) -> JanitorState {
        *self.state.borrow()
    }

    /// Receiver for state transitions
    pub fn subscribe(&self) -> watch::Receiver<JanitorState> {
        self.state.clone()
    }

    /// Request shutdown and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            log::error!("Janitor task ended abnormally: {}", e);
        }
    }
}
