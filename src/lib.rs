//! # tickfan
//!
//! **tickfan** is a fan-out scheduling benchmark: it spawns a large number of
//! lightweight units, each driven forever by its own recurring timer, all
//! writing to one shared output sink.
//!
//! It measures how a many-to-few scheduler behaves under sustained concurrency:
//! the cost of creating N concurrent contexts, of servicing N independent
//! timers, and of N writers contending on one stream.
//!
//! ## Architecture
//! ```text
//!                         ┌──────────────────────────────┐
//!                         │ Bench                        │
//!                         │  - Config (N, P, sink, ...)  │
//!                         │  - Bus (broadcast events)    │
//!                         │  - SubscriberSet             │
//!                         └──────┬──────────────┬────────┘
//!                                ▼              ▼
//!                         ┌────────────┐  ┌──────────────┐
//!                         │  Spawner   │  │ LivenessGate │ ◄── parks forever by default
//!                         └─────┬──────┘  └──────────────┘
//!            ┌──────────────────┼───────────────────┐
//!            ▼                  ▼                   ▼
//!     ┌─────────────┐    ┌─────────────┐     ┌─────────────┐
//!     │ WorkUnit 0  │    │ WorkUnit 1  │ ... │ WorkUnit N-1│
//!     │ Trigger(P)  │    │ Trigger(P)  │     │ Trigger(P)  │
//!     └──────┬──────┘    └──────┬──────┘     └──────┬──────┘
//!            │ write            │ write             │ write
//!            ▼                  ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │            Sink (LockedSink | BatchedSink | custom)               │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Unit lifecycle
//! ```text
//! loop {
//!   ├─► await next tick (timer wheel; no thread held)
//!   ├─► sink.write("<message> <id>")
//!   │       └─ Err ─► publish SinkWriteFailed, keep schedule
//!   └─► exit only when the unit's token is cancelled
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types                              |
//! |-------------------|---------------------------------------------------------|----------------------------------------|
//! | **Fan-out**       | Spawn N units without waiting on any of them.           | [`Spawner`], [`FanOut`]                |
//! | **Triggers**      | Per-unit periodic schedule on tokio's timer wheel.      | [`Trigger`], [`MissedTick`], [`PhasePolicy`] |
//! | **Sinks**         | Lock-per-write or queue-and-batch output.               | [`Sink`], [`LockedSink`], [`BatchedSink`] |
//! | **Liveness**      | Zero-cost indefinite park after spawning.               | [`LivenessGate`]                       |
//! | **Events**        | Observe fan-out, sink failures and shutdown.            | [`Event`], [`Subscribe`], [`LogWriter`] |
//! | **Errors**        | Fatal runtime errors and per-firing sink errors.        | [`RuntimeError`], [`SinkError`]        |
//! | **Configuration** | All run settings in one place.                          | [`Config`]                             |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tickfan::{Bench, Config, LockedSink};
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() -> Result<(), tickfan::RuntimeError> {
//!     let cfg = Config {
//!         units: 3,
//!         period: Duration::from_millis(10),
//!         ..Config::default()
//!     };
//!     let sink = Arc::new(LockedSink::new(Vec::new()));
//!     let bench = Bench::builder(cfg).with_sink(sink.clone()).build();
//!
//!     let runner = Arc::clone(&bench);
//!     let run = tokio::spawn(async move { runner.run().await });
//!
//!     tokio::time::sleep(Duration::from_millis(100)).await;
//!     bench.release();
//!     let report = run.await.expect("bench task panicked")?;
//!     assert_eq!(report.units, 3);
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod sinks;
mod subscribers;
mod units;

// ---- Public re-exports ----

pub use crate::core::{
    Bench, BenchBuilder, Config, FanOut, LivenessGate, Report, ShutdownMode, Spawner, Topology,
};
pub use error::{RuntimeError, SinkError};
pub use events::{Bus, Event, EventKind};
pub use sinks::{BatchedSink, LockedSink, OutputEvent, Sink, SinkMode, SinkRef};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use units::{MissedTick, PhasePolicy, Trigger, UnitParams, WorkUnit};
