//! # Work units and their recurring triggers.
//!
//! - [`WorkUnit`] - one logical unit of the fan-out (identity + firing loop)
//! - [`UnitParams`] - trigger and message shared by all units
//! - [`Trigger`] - periodic schedule backed by a tokio interval
//! - [`MissedTick`] - catch-up behavior when a trigger falls behind
//! - [`PhasePolicy`] - offset of the first firing

mod phase;
mod trigger;
mod unit;

pub use phase::PhasePolicy;
pub use trigger::{MissedTick, Trigger};
pub use unit::{UnitParams, WorkUnit};
