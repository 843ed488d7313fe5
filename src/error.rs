//! Error types used by the tickfan runtime and its output sinks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`] - errors raised by the benchmark harness itself (fatal to the run).
//! - [`SinkError`] - errors raised while emitting a single output line (never fatal).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the tickfan runtime.
///
/// Every variant aborts the run. Failures local to one unit's firing are
/// reported as [`SinkError`] and never reach this type.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration rejected before anything was spawned.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A new concurrent context could not be created (resource exhaustion).
    #[error("failed to spawn execution context for unit {unit}: {error}")]
    SpawnFailed {
        /// First unit identity that could not be started.
        unit: u64,
        /// The underlying OS error message.
        error: String,
    },

    /// A per-core scheduler could not be built.
    #[error("failed to build scheduler: {error}")]
    RuntimeBuild {
        /// The underlying OS error message.
        error: String,
    },

    /// Termination signal listeners could not be registered.
    #[error("failed to install signal handlers: {error}")]
    Signal {
        /// The underlying OS error message.
        error: String,
    },

    /// Shutdown grace period was exceeded; some units were still running.
    #[error("shutdown timeout {grace:?} exceeded; {pending} still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Units (shared topology) or partitions (per-core topology) not yet stopped.
        pending: usize,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use tickfan::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), pending: 3 };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig { .. } => "runtime_invalid_config",
            RuntimeError::SpawnFailed { .. } => "runtime_spawn_failed",
            RuntimeError::RuntimeBuild { .. } => "runtime_build_failed",
            RuntimeError::Signal { .. } => "runtime_signal_failed",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidConfig { reason } => format!("config: {reason}"),
            RuntimeError::SpawnFailed { unit, error } => {
                format!("spawn failed at unit={unit}: {error}")
            }
            RuntimeError::RuntimeBuild { error } => format!("scheduler: {error}"),
            RuntimeError::Signal { error } => format!("signal: {error}"),
            RuntimeError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; pending={pending}")
            }
        }
    }
}

/// # Errors produced while emitting output.
///
/// A sink error affects exactly one firing of one unit. The unit logs it and
/// keeps its schedule; nothing is retried.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SinkError {
    /// The underlying writer rejected the line.
    #[error("write failed: {error}")]
    Write {
        /// The underlying I/O error message.
        error: String,
    },

    /// The sink's writer has gone away and accepts no more lines.
    #[error("sink closed")]
    Closed,
}

impl SinkError {
    /// Wraps an I/O error.
    pub fn write(err: std::io::Error) -> Self {
        SinkError::Write {
            error: err.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use tickfan::SinkError;
    ///
    /// assert_eq!(SinkError::Closed.as_label(), "sink_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::Write { .. } => "sink_write_failed",
            SinkError::Closed => "sink_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SinkError::Write { error } => format!("write: {error}"),
            SinkError::Closed => "sink closed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let spawn = RuntimeError::SpawnFailed {
            unit: 7,
            error: "Resource temporarily unavailable".into(),
        };
        assert_eq!(spawn.as_label(), "runtime_spawn_failed");
        assert!(spawn.as_message().contains("unit=7"));

        let write = SinkError::write(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(write.as_label(), "sink_write_failed");
        assert!(write.to_string().starts_with("write failed"));
    }

    #[test]
    fn grace_exceeded_reports_pending() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_millis(250),
            pending: 12,
        };
        assert_eq!(err.as_message(), "grace exceeded after 250ms; pending=12");
    }
}
