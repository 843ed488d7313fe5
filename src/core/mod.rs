//! Runtime core: fan-out, liveness and shutdown.
//!
//! Internal modules:
//! - [`config`]: run configuration and its sentinel helpers;
//! - [`spawner`]: creates the N units (shared or per-core topology);
//! - [`gate`]: the zero-cost indefinite suspension after spawning;
//! - [`bench`]: wires bus, subscribers, sink, spawner and gate together;
//! - [`builder`]: constructs a [`Bench`];
//! - [`shutdown`]: cross-platform termination signals.

mod bench;
mod builder;
mod config;
mod gate;
mod shutdown;
mod spawner;

pub use bench::{Bench, Report};
pub use builder::BenchBuilder;
pub use config::{Config, ShutdownMode, Topology};
pub use gate::LivenessGate;
pub use spawner::{FanOut, Spawner};
