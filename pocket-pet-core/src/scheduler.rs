//! Passive stat decay.
//!
//! The [`DecayScheduler`] spawns a tokio task that calls
//! [`PetStore::apply_decay`](crate::store::PetStore::apply_decay) once per
//! interval. It holds no pet state and does no arithmetic of its own; all
//! rules live in the store. The returned [`DecayHandle`] is the only way to
//! stop the task, and dropping it stops the task too.

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{Outcome, SharedStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default time between decay ticks.
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_secs(10);

/// Starts decay tasks at a fixed cadence.
#[derive(Debug, Clone, Copy)]
pub struct DecayScheduler {
    interval: Duration,
}

impl Default for DecayScheduler {
    fn default() -> Self {
        Self {
            interval: DEFAULT_DECAY_INTERVAL,
        }
    }
}

impl DecayScheduler {
    /// Create a scheduler ticking every `interval`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::config_error("decay interval must be non-zero"));
        }
        Ok(Self { interval })
    }

    /// Create a scheduler from a validated `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(config.decay_interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking against `store`.
    ///
    /// Returns `None` without spawning anything if the store has no pet.
    /// The first tick happens one full interval after this call.
    pub async fn start(&self, store: SharedStore, clock: Arc<dyn Clock>) -> Option<DecayHandle> {
        if !store.lock().await.has_pet() {
            debug!("no pet, decay scheduler not started");
            return None;
        }

        let period = self.interval;
        let ticks = Arc::new(AtomicU64::new(0));
        let task_ticks = Arc::clone(&ticks);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit stop and when the handle is dropped.
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let now = clock.now();
                        let result = store.lock().await.apply_decay(now);
                        let tick = task_ticks.fetch_add(1, Ordering::SeqCst) + 1;
                        match result {
                            Ok(Outcome::Applied) => debug!(tick, "decay tick"),
                            Ok(Outcome::NoPet) => debug!(tick, "decay tick without pet"),
                            Err(e) => warn!(tick, error = %e, "decay tick could not be saved"),
                        }
                    }
                }
            }
            debug!("decay task exited");
        });

        info!(interval_secs = period.as_secs_f64(), "decay scheduler started");
        Some(DecayHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            ticks,
        })
    }
}

/// Handle to a running decay task.
#[derive(Debug)]
pub struct DecayHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl DecayHandle {
    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Check if the task is still alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the task and wait for it to exit.
    ///
    /// Once this returns no further decay call will be made.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "decay task panicked");
                }
            }
        }
        info!(ticks = self.ticks(), "decay scheduler stopped");
    }
}

impl Drop for DecayHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
