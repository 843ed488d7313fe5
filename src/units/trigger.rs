//! # Recurring trigger.
//!
//! A [`Trigger`] turns a period into a tokio [`Interval`]. Intervals are entries
//! in tokio's shared timer wheel, which the runtime's small worker pool services;
//! a unit waiting for its next tick holds no thread.
//!
//! ## Schedule
//! ```text
//! start ── first_delay ──► tick ── P ──► tick ── P ──► tick ...
//!          (PhasePolicy)
//! ```
//! Ticks are anchored to the trigger's own start, never to other triggers.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::phase::PhasePolicy;

/// What a trigger does when it falls behind its schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MissedTick {
    /// Fire every missed tick as fast as possible, staying on the `start + k*P` grid.
    #[default]
    Burst,
    /// Fire once, then restart the period from now.
    Delay,
    /// Fire once, then resume on the original grid, skipping missed ticks.
    Skip,
}

impl From<MissedTick> for MissedTickBehavior {
    fn from(m: MissedTick) -> Self {
        match m {
            MissedTick::Burst => MissedTickBehavior::Burst,
            MissedTick::Delay => MissedTickBehavior::Delay,
            MissedTick::Skip => MissedTickBehavior::Skip,
        }
    }
}

/// Periodic firing schedule of one unit.
#[derive(Clone, Copy, Debug)]
pub struct Trigger {
    /// Time between firings. Must be non-zero.
    pub period: Duration,
    /// Behavior when firings fall behind.
    pub missed_tick: MissedTick,
    /// Offset of the first firing.
    pub phase: PhasePolicy,
}

impl Trigger {
    /// Aligned, bursting trigger with `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            missed_tick: MissedTick::default(),
            phase: PhasePolicy::default(),
        }
    }

    /// Starts the schedule now.
    pub fn start(&self) -> Interval {
        self.start_at(Instant::now())
    }

    /// Starts the schedule anchored at `origin`; ticks already due fire per [`MissedTick`].
    ///
    /// # Panics
    /// Panics if `period` is zero, like [`tokio::time::interval_at`].
    /// [`Config::validate`](crate::Config::validate) rejects zero periods up front.
    pub fn start_at(&self, origin: Instant) -> Interval {
        let first = origin + self.phase.first_delay(self.period);
        let mut ticks = time::interval_at(first, self.period);
        ticks.set_missed_tick_behavior(self.missed_tick.into());
        ticks
    }
}
