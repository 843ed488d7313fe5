//! # WorkUnit: one independently scheduled unit of the fan-out.
//!
//! ## Loop
//! ```text
//! WorkUnit::run(token)
//!
//! ticks = trigger.start_at(creation time)
//! loop {
//!   ├─► wait: token cancelled ─► exit (returns firing count)
//!   │         next tick       ─► continue
//!   ├─► sink.write(OutputEvent{ id, message })
//!   │       ├─ Ok  ─► next
//!   │       └─ Err ─► publish SinkWriteFailed{ unit, reason }, next
//!   └─► firings += 1
//! }
//! ```
//!
//! ## Rules
//! - Firings of one unit are **sequential**: the next tick is not awaited until the write returns.
//! - A failed write is **not retried**; the next firing keeps its own schedule.
//! - Cancellation is observed between firings only, so a started write always completes.

use std::sync::Arc;

use tokio::{select, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    events::{Bus, Event, EventKind},
    sinks::{OutputEvent, SinkRef},
};

use super::trigger::Trigger;

/// Parameters shared by every unit of one fan-out.
#[derive(Clone, Debug)]
pub struct UnitParams {
    /// Firing schedule.
    pub trigger: Trigger,
    /// Fixed message written on each firing.
    pub message: Arc<str>,
}

/// One logical unit: an identity, its trigger, and handles to the shared sink and bus.
pub struct WorkUnit {
    id: u64,
    params: UnitParams,
    /// Creation time; the schedule counts periods from here, not from the first poll.
    origin: Instant,
    sink: SinkRef,
    bus: Bus,
}

impl WorkUnit {
    /// Creates unit `id`. Its schedule starts now.
    pub fn new(id: u64, params: UnitParams, sink: SinkRef, bus: Bus) -> Self {
        Self {
            id,
            params,
            origin: Instant::now(),
            sink,
            bus,
        }
    }

    /// Returns the unit identity.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Fires until `token` is cancelled and returns how many firings happened.
    ///
    /// Without cancellation this never returns.
    pub async fn run(self, token: CancellationToken) -> u64 {
        let mut ticks = self.params.trigger.start_at(self.origin);
        let event = OutputEvent::new(self.id, self.params.message.clone());
        let mut firings = 0u64;

        loop {
            select! {
                biased;
                _ = token.cancelled() => return firings,
                _ = ticks.tick() => {}
            }

            if let Err(e) = self.sink.write(&event).await {
                self.bus.publish(
                    Event::new(EventKind::SinkWriteFailed)
                        .with_unit(self.id)
                        .with_name(self.sink.name())
                        .with_reason(e.to_string()),
                );
            }
            firings += 1;
        }
    }
}
