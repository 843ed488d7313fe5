//! # Output sink abstraction.
//!
//! A [`Sink`] is the one shared mutable resource of the benchmark: every unit
//! writes its firing line to the same sink.
//!
//! ## Contract
//! - A line accepted by [`Sink::write`] is emitted whole; lines from different
//!   units never interleave within a line.
//! - No ordering across units.
//! - A failing write affects one firing only. Callers report it and move on.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SinkError;

use super::OutputEvent;

/// Shared output destination for unit firings.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tickfan::{OutputEvent, Sink, SinkError};
///
/// struct Discard;
///
/// #[async_trait]
/// impl Sink for Discard {
///     async fn write(&self, _ev: &OutputEvent) -> Result<(), SinkError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Sink: Send + Sync + 'static {
    /// Emits one firing. May suspend while the sink is contended.
    async fn write(&self, ev: &OutputEvent) -> Result<(), SinkError>;

    /// Pushes any buffered lines to the underlying writer.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a sink, cloned into every unit.
pub type SinkRef = Arc<dyn Sink>;
