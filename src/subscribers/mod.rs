//! # Event subscribers for the tickfan runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ```text
//! Unit / Sink / Bench ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                              │
//!                                                                   ┌──────────┼─────────┐
//!                                                                   ▼          ▼         ▼
//!                                                               LogWriter   Custom      ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use tickfan::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::SinkWriteFailed {
//!             // count it
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
