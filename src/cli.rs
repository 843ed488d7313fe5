//! Command-line arguments.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tickfan::{Config, MissedTick, PhasePolicy, ShutdownMode, SinkMode, Topology};

/// Spawn N lightweight units, each printing a line on its own recurring timer, forever.
#[derive(Parser, Debug, Clone)]
#[command(name = "tickfan")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Number of units to spawn
    #[arg(short = 'n', long = "units", default_value_t = 100_000)]
    pub units: u64,

    /// Firing period of every unit, in milliseconds
    #[arg(short = 'p', long = "period-ms", default_value_t = 10)]
    pub period_ms: u64,

    /// Message printed on each firing (followed by the unit id)
    #[arg(short = 'm', long = "message", default_value = "hello world!")]
    pub message: String,

    // ===== Scheduling =====
    /// Scheduler layout
    #[arg(long = "topology", value_enum, default_value_t = TopologyArg::Shared)]
    pub topology: TopologyArg,

    /// Worker threads (0 = available parallelism)
    #[arg(short = 't', long = "workers", default_value_t = 0)]
    pub workers: usize,

    /// Offset of each unit's first firing
    #[arg(long = "phase", value_enum, default_value_t = PhaseArg::Aligned)]
    pub phase: PhaseArg,

    /// What a late trigger does
    #[arg(long = "missed-tick", value_enum, default_value_t = MissedTickArg::Burst)]
    pub missed_tick: MissedTickArg,

    // ===== Output =====
    /// Output sink discipline
    #[arg(long = "sink", value_enum, default_value_t = SinkArg::Locked)]
    pub sink: SinkArg,

    /// Queue length of the batched sink
    #[arg(long = "batch-capacity", default_value_t = 65_536)]
    pub batch_capacity: usize,

    /// Batched sink flushes at least every N lines
    #[arg(long = "flush-every", default_value_t = 4096)]
    pub flush_every: usize,

    // ===== Lifetime =====
    /// Stop gracefully on SIGINT/SIGTERM instead of dying on the signal
    #[arg(long = "graceful")]
    pub graceful: bool,

    /// Stop gracefully after this many milliseconds (0 = run forever)
    #[arg(long = "run-for-ms", default_value_t = 0)]
    pub run_for_ms: u64,

    /// Maximum wait for units to stop on graceful shutdown, in milliseconds
    #[arg(long = "grace-ms", default_value_t = 5000)]
    pub grace_ms: u64,

    // ===== Logging =====
    /// Debug-level diagnostics on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Errors only on stderr
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyArg {
    #[default]
    Shared,
    PerCore,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseArg {
    #[default]
    Aligned,
    Spread,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissedTickArg {
    #[default]
    Burst,
    Delay,
    Skip,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkArg {
    #[default]
    Locked,
    Batched,
}

impl CliArgs {
    /// Maps the flags onto a run configuration.
    pub fn to_config(&self) -> Config {
        Config {
            units: self.units,
            period: Duration::from_millis(self.period_ms),
            message: Arc::from(self.message.as_str()),
            missed_tick: match self.missed_tick {
                MissedTickArg::Burst => MissedTick::Burst,
                MissedTickArg::Delay => MissedTick::Delay,
                MissedTickArg::Skip => MissedTick::Skip,
            },
            phase: match self.phase {
                PhaseArg::Aligned => PhasePolicy::Aligned,
                PhaseArg::Spread => PhasePolicy::Spread,
            },
            sink: match self.sink {
                SinkArg::Locked => SinkMode::Locked,
                SinkArg::Batched => SinkMode::Batched {
                    capacity: self.batch_capacity,
                    flush_every: self.flush_every,
                },
            },
            topology: match self.topology {
                TopologyArg::Shared => Topology::Shared,
                TopologyArg::PerCore => Topology::PerCore,
            },
            workers: self.workers,
            shutdown: if self.graceful {
                ShutdownMode::OnSignal
            } else {
                ShutdownMode::Never
            },
            run_for: Duration::from_millis(self.run_for_ms),
            grace: Duration::from_millis(self.grace_ms),
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let cfg = CliArgs::parse_from(["tickfan"]).to_config();
        let lib = Config::default();
        assert_eq!(cfg.units, lib.units);
        assert_eq!(cfg.period, lib.period);
        assert_eq!(cfg.message, lib.message);
        assert_eq!(cfg.sink, lib.sink);
        assert_eq!(cfg.shutdown, ShutdownMode::Never);
        assert!(cfg.run_limit().is_none());
    }

    #[test]
    fn flags_map_onto_config() {
        let cfg = CliArgs::parse_from([
            "tickfan",
            "-n",
            "3",
            "--period-ms",
            "25",
            "--sink",
            "batched",
            "--flush-every",
            "8",
            "--topology",
            "per-core",
            "--workers",
            "2",
            "--graceful",
            "--run-for-ms",
            "1000",
        ])
        .to_config();

        assert_eq!(cfg.units, 3);
        assert_eq!(cfg.period, Duration::from_millis(25));
        assert_eq!(
            cfg.sink,
            SinkMode::Batched {
                capacity: 65_536,
                flush_every: 8
            }
        );
        assert_eq!(cfg.topology, Topology::PerCore);
        assert_eq!(cfg.worker_count(), 2);
        assert_eq!(cfg.shutdown, ShutdownMode::OnSignal);
        assert_eq!(cfg.run_limit(), Some(Duration::from_secs(1)));
    }
}
