//! # LogWriter - event renderer over `tracing`
//!
//! A subscriber that turns runtime [`Event`]s into `tracing` records. The binary
//! routes these to stderr so they never mix with the firing lines on stdout.
//!
//! ## Example output
//! ```text
//! INFO fan-out starting units=100000
//! INFO fan-out completed units=100000 elapsed_ms=41
//! INFO liveness gate engaged
//! WARN sink write failed unit=17 sink="locked" err="write failed: Broken pipe (os error 32)"
//! INFO shutdown requested
//! INFO all units stopped within grace units=100000
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let name = e.name.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("unknown");

        match e.kind {
            EventKind::FanOutStarting => {
                info!(units = e.units, "fan-out starting");
            }
            EventKind::FanOutCompleted => {
                info!(units = e.units, elapsed_ms = e.elapsed_ms, "fan-out completed");
            }
            EventKind::GateEngaged => {
                info!("liveness gate engaged");
            }
            EventKind::SinkWriteFailed => {
                warn!(unit = e.unit, sink = name, err = reason, "sink write failed");
            }
            EventKind::SinkFlushFailed => {
                warn!(sink = name, err = reason, "sink flush failed");
            }
            EventKind::ShutdownRequested => {
                info!("shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!(units = e.units, "all units stopped within grace");
            }
            EventKind::GraceExceeded => {
                error!(pending = e.units, "grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = name, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = name, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
