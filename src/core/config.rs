//! # Global benchmark configuration.
//!
//! Provides [`Config`], the centralized settings for one benchmark run. All
//! values are fixed at startup; nothing is reconfigurable while units run.
//!
//! ## Sentinel values
//! - `workers = 0` → available parallelism
//! - `run_for = 0s` → no run limit
//! - `grace = 0s` → do not wait for units after cancelling them

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::RuntimeError;
use crate::sinks::SinkMode;
use crate::units::{MissedTick, PhasePolicy, Trigger, UnitParams};

/// Where units are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Topology {
    /// All units on one work-stealing runtime with `workers` threads.
    #[default]
    Shared,
    /// `workers` OS threads, each with its own single-threaded runtime owning a
    /// contiguous slice of unit identities.
    PerCore,
}

/// What may release the liveness gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    /// Nothing inside the process: the gate stays closed until the process is killed.
    #[default]
    Never,
    /// SIGINT/SIGTERM/SIGQUIT (Ctrl-C on other platforms) release the gate and
    /// run the graceful-shutdown path.
    OnSignal,
}

/// Configuration for one benchmark run.
///
/// ## Field semantics
/// - `units`: number of work units N (ids `0..N`)
/// - `period`: firing period P shared by every unit (must be non-zero)
/// - `message`: fixed text written on every firing
/// - `missed_tick` / `phase`: trigger tuning, see [`MissedTick`] and [`PhasePolicy`]
/// - `sink`: stdout sink discipline when no custom sink is injected
/// - `topology` / `workers`: scheduler layout (`workers = 0` = available parallelism)
/// - `shutdown` / `run_for` / `grace`: optional ways out of the liveness gate
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of units to spawn.
    pub units: u64,
    /// Firing period of every unit.
    pub period: Duration,
    /// Message written on each firing.
    pub message: Arc<str>,
    /// Catch-up behavior for late triggers.
    pub missed_tick: MissedTick,
    /// Offset of each trigger's first firing.
    pub phase: PhasePolicy,
    /// Stdout sink discipline.
    pub sink: SinkMode,
    /// Scheduler layout.
    pub topology: Topology,
    /// Worker threads (`0` = available parallelism).
    pub workers: usize,
    /// Whether a termination signal releases the gate.
    pub shutdown: ShutdownMode,
    /// Release the gate after this long (`0s` = never).
    pub run_for: Duration,
    /// Maximum wait for units to stop once the gate is released.
    pub grace: Duration,
    /// Capacity of the event bus.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the number of worker threads to use.
    #[inline]
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            self.workers
        }
    }

    /// Returns the run limit as an `Option`.
    ///
    /// - `None` → run until killed (or signalled, see [`ShutdownMode`])
    /// - `Some(d)` → release the gate after `d`
    #[inline]
    pub fn run_limit(&self) -> Option<Duration> {
        if self.run_for == Duration::ZERO {
            None
        } else {
            Some(self.run_for)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the trigger every unit starts with.
    pub fn trigger(&self) -> Trigger {
        Trigger {
            period: self.period,
            missed_tick: self.missed_tick,
            phase: self.phase,
        }
    }

    /// Returns the parameters shared by every unit.
    pub fn unit_params(&self) -> UnitParams {
        UnitParams {
            trigger: self.trigger(),
            message: self.message.clone(),
        }
    }

    /// Rejects configurations that cannot run.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.period.is_zero() {
            return Err(RuntimeError::InvalidConfig {
                reason: "period must be greater than zero".into(),
            });
        }
        if let SinkMode::Batched { capacity: 0, .. } = self.sink {
            return Err(RuntimeError::InvalidConfig {
                reason: "batched sink capacity must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `units = 100_000`, `period = 10ms`, `message = "hello world!"`
    /// - aligned, bursting triggers
    /// - locked stdout sink, shared topology, `workers = 0`
    /// - `shutdown = Never`, `run_for = 0s` (run until killed)
    /// - `grace = 5s`, `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            units: 100_000,
            period: Duration::from_millis(10),
            message: Arc::from("hello world!"),
            missed_tick: MissedTick::default(),
            phase: PhasePolicy::default(),
            sink: SinkMode::default(),
            topology: Topology::default(),
            workers: 0,
            shutdown: ShutdownMode::default(),
            run_for: Duration::ZERO,
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_forever() {
        let cfg = Config::default();
        assert_eq!(cfg.units, 100_000);
        assert_eq!(cfg.period, Duration::from_millis(10));
        assert_eq!(cfg.shutdown, ShutdownMode::Never);
        assert!(cfg.run_limit().is_none());
        assert!(cfg.worker_count() >= 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_period_is_rejected() {
        let cfg = Config {
            period: Duration::ZERO,
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.as_label(), "runtime_invalid_config");
    }

    #[test]
    fn unit_params_follow_config() {
        let cfg = Config {
            period: Duration::from_millis(3),
            phase: PhasePolicy::Spread,
            message: Arc::from("tick"),
            workers: 2,
            ..Config::default()
        };
        let params = cfg.unit_params();
        assert_eq!(params.trigger.period, Duration::from_millis(3));
        assert_eq!(params.trigger.phase, PhasePolicy::Spread);
        assert_eq!(&*params.message, "tick");
        assert_eq!(cfg.worker_count(), 2);
    }
}
