//! # Shared output sinks.
//!
//! - [`Sink`] - trait every unit writes its firing line to
//! - [`SinkRef`] - shared handle (`Arc<dyn Sink>`) cloned into every unit
//! - [`LockedSink`] - one mutex acquisition and one stream write per firing
//! - [`BatchedSink`] - bounded queue drained by a single buffered writer task
//! - [`OutputEvent`] - what a firing emits
//!
//! ## Choosing a discipline
//! ```text
//! SinkMode::Locked   → measures scheduling + mutex contention + one syscall per line
//! SinkMode::Batched  → measures scheduling + queue contention; stream cost amortized
//! ```
//! Both keep each line whole and emit every firing exactly once.

mod batched;
mod locked;
mod output;
mod sink;

use std::sync::Arc;

use crate::events::Bus;

pub use batched::BatchedSink;
pub use locked::LockedSink;
pub use output::OutputEvent;
pub use sink::{Sink, SinkRef};

/// Which sink discipline the bench builds over stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkMode {
    /// Lock-per-write ([`LockedSink`]).
    Locked,
    /// Queue-and-batch ([`BatchedSink`]).
    Batched {
        /// Queue length before firing units suspend.
        capacity: usize,
        /// Flush at least every N lines.
        flush_every: usize,
    },
}

impl Default for SinkMode {
    /// Returns [`SinkMode::Locked`].
    fn default() -> Self {
        SinkMode::Locked
    }
}

impl SinkMode {
    /// Builds the stdout sink for this mode.
    ///
    /// Must be called from within a tokio runtime.
    pub fn stdout(self, bus: &Bus) -> SinkRef {
        match self {
            SinkMode::Locked => Arc::new(LockedSink::stdout()),
            SinkMode::Batched {
                capacity,
                flush_every,
            } => Arc::new(BatchedSink::stdout(capacity, flush_every, bus.clone())),
        }
    }
}
