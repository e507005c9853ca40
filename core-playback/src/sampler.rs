//! Progress sampler.
//!
//! Owns the recurring sampling task and the dedup baseline. The sampler does
//! not know about players or phases: each tick invokes a callback with the
//! generation the task was started under, and the callback decides (under the
//! controller lock) whether the tick is still current.

use crate::error::{PlaybackError, Result};
use core_async::runtime::Handle;
use core_async::sync::CancellationToken;
use core_async::task::JoinHandle;
use core_async::time::{as_millis_u64, interval, Duration, MissedTickBehavior};
use tracing::{debug, trace};

/// What the tick callback wants the task to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// Result of feeding a position reading to the dedup filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The floored position differs from the last publication.
    Publish,
    /// Same bucket as the last publication; suppress.
    Unchanged,
}

struct SamplerTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodic position sampler with duplicate suppression.
pub struct ProgressSampler {
    period: Duration,
    granularity: Duration,
    /// Floored bucket of the last published position; `None` never matches.
    baseline: Option<u128>,
    generation: u64,
    task: Option<SamplerTask>,
}

impl ProgressSampler {
    /// Create an idle sampler ticking every `period` and publishing at
    /// `granularity` resolution. Zero values are raised to one millisecond.
    pub fn new(period: Duration, granularity: Duration) -> Self {
        let floor = Duration::from_millis(1);
        Self {
            period: period.max(floor),
            granularity: granularity.max(floor),
            baseline: None,
            generation: 0,
            task: None,
        }
    }

    /// Whether a sampling task is currently running.
    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Generation of the current (or most recently stopped) task.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop any running task, then spawn a new one that calls `on_tick` with
    /// its generation every period. The first tick fires immediately.
    ///
    /// Fails with [`PlaybackError::RuntimeUnavailable`] outside an async
    /// runtime; the sampler is left stopped in that case.
    pub fn start<F>(&mut self, mut on_tick: F) -> Result<u64>
    where
        F: FnMut(u64) -> TickOutcome + Send + 'static,
    {
        self.stop();

        let runtime = Handle::try_current().map_err(|_| PlaybackError::RuntimeUnavailable)?;

        let generation = self.generation;
        let period = self.period;
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                core_async::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if on_tick(generation) == TickOutcome::Stop {
                            break;
                        }
                    }
                }
            }
            trace!(generation, "Sampler task exited");
        });

        self.task = Some(SamplerTask { token, handle });
        debug!(generation, period_ms = as_millis_u64(period), "Sampler started");
        Ok(generation)
    }

    /// Cancel the running task (if any), retire its generation and reset the
    /// dedup baseline. Idempotent.
    pub fn stop(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.baseline = None;

        if let Some(task) = self.task.take() {
            task.token.cancel();
            task.handle.abort();
            debug!(generation = self.generation, "Sampler stopped");
        }
    }

    /// Forget the last published position so the next observation publishes.
    pub fn reset_baseline(&mut self) {
        self.baseline = None;
    }

    /// Feed a reading to the dedup filter.
    pub fn observe(&mut self, position: Duration) -> Observation {
        let bucket = position.as_nanos() / self.granularity.as_nanos();
        if self.baseline == Some(bucket) {
            return Observation::Unchanged;
        }
        self.baseline = Some(bucket);
        Observation::Publish
    }
}

impl Drop for ProgressSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ProgressSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSampler")
            .field("period", &self.period)
            .field("granularity", &self.granularity)
            .field("generation", &self.generation)
            .field("active", &self.is_active())
            .finish()
    }
}
