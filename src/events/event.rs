//! # Runtime events emitted by the bench harness, units and sinks.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Fan-out events**: spawning progress and the liveness gate
//! - **Sink events**: per-firing write failures and batched flush failures
//! - **Shutdown events**: the optional graceful-shutdown path
//! - **Subscriber events**: queue overflow and panics inside subscribers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, unit
//! identity, unit counts and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use tickfan::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SinkWriteFailed)
//!     .with_unit(42)
//!     .with_reason("broken pipe");
//!
//! assert_eq!(ev.kind, EventKind::SinkWriteFailed);
//! assert_eq!(ev.unit, Some(42));
//! assert_eq!(ev.reason.as_deref(), Some("broken pipe"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Fan-out events ===
    /// Spawner is about to create units.
    ///
    /// Sets:
    /// - `units`: number of units to spawn
    FanOutStarting,

    /// All units were handed to the scheduler.
    ///
    /// Sets:
    /// - `units`: number of units spawned
    /// - `elapsed_ms`: wall time spent spawning
    FanOutCompleted,

    /// The spawning path is now parked on the liveness gate.
    GateEngaged,

    // === Sink events ===
    /// One firing's output line could not be written (non-fatal).
    ///
    /// Sets:
    /// - `unit`: firing unit identity
    /// - `name`: sink name
    /// - `reason`: error message
    SinkWriteFailed,

    /// A batched sink failed to write or flush buffered lines (non-fatal).
    ///
    /// Sets:
    /// - `name`: sink name
    /// - `reason`: error message
    SinkFlushFailed,

    // === Shutdown events ===
    /// Gate released (signal, run limit or explicit release).
    ShutdownRequested,

    /// All units stopped within configured grace period.
    ///
    /// Sets:
    /// - `units`: units that were running
    AllStoppedWithin,

    /// Grace period exceeded; some units did not stop in time.
    ///
    /// Sets:
    /// - `units`: units or partitions still running
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Identity of the unit the event concerns.
    pub unit: Option<u64>,
    /// Unit (or partition) count.
    pub units: Option<u64>,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: Option<u64>,
    /// Name of the sink or subscriber involved.
    pub name: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            unit: None,
            units: None,
            elapsed_ms: None,
            name: None,
            reason: None,
        }
    }

    /// Attaches a unit identity.
    #[inline]
    pub fn with_unit(mut self, unit: u64) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attaches a unit count.
    #[inline]
    pub fn with_units(mut self, units: u64) -> Self {
        self.units = Some(units);
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a sink or subscriber name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_name(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(subscriber)
            .with_reason(info)
    }

    /// Returns `true` for events raised by the subscriber machinery itself.
    ///
    /// Overflow of such an event is not re-published, so a full queue cannot
    /// feed itself.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::GateEngaged);
        let b = Event::new(EventKind::GateEngaged);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn elapsed_is_stored_in_millis() {
        let ev = Event::new(EventKind::FanOutCompleted)
            .with_units(100_000)
            .with_elapsed(Duration::from_micros(12_345));
        assert_eq!(ev.units, Some(100_000));
        assert_eq!(ev.elapsed_ms, Some(12));
    }

    #[test]
    fn subscriber_helpers_set_name() {
        let ev = Event::subscriber_overflow("log", "full");
        assert!(ev.is_subscriber_event());
        assert_eq!(ev.name.as_deref(), Some("log"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }
}
