use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

/// One firing of the refresh timer.
///
/// `generation` identifies the arm that produced the tick, so ticks already
/// queued by a cancelled timer can be told apart from live ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTick {
    pub generation: u64,
}

struct ArmedTimer {
    generation: u64,
    task: JoinHandle<()>,
}

/// Pausable, resettable periodic refresh timer
/// Sends a [`PollTick`] every `period` while enabled and armed
pub struct PollScheduler {
    period: Duration,
    enabled: bool,
    generation: u64,
    timer: Option<ArmedTimer>,
    ticks: mpsc::UnboundedSender<PollTick>,
}

impl PollScheduler {
    /// Create an enabled but not yet armed scheduler
    pub fn new(period: Duration, ticks: mpsc::UnboundedSender<PollTick>) -> Self {
        Self {
            period,
            enabled: true,
            generation: 0,
            timer: None,
            ticks,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True while a timer task is registered
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Flip between enabled and paused; returns the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            self.reset();
        } else {
            self.cancel();
        }
        self.enabled
    }

    /// Cancel any armed timer and, if enabled, arm a fresh one.
    ///
    /// The first tick of the new timer arrives one full period from now.
    pub fn reset(&mut self) {
        self.cancel();
        if !self.enabled {
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let ticks = self.ticks.clone();
        let start = Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if ticks.send(PollTick { generation }).is_err() {
                    // Receiver dropped, nobody left to refresh for
                    break;
                }
            }
        });

        debug!(
            "Armed refresh timer #{} every {}ms",
            generation,
            period.as_millis()
        );
        self.timer = Some(ArmedTimer { generation, task });
    }

    /// Cancel the armed timer, if any. In-flight work started by earlier
    /// ticks is not affected.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.task.abort();
            debug!("Cancelled refresh timer #{}", timer.generation);
        }
    }

    /// Whether a received tick came from the currently armed timer
    pub fn accepts(&self, tick: &PollTick) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| timer.generation == tick.generation)
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
