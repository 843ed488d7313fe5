//! # Output event produced by one firing.

use std::fmt;
use std::sync::Arc;

/// One firing of one unit: the unit identity plus the fixed message.
///
/// Rendered as a single newline-terminated line, `"<message> <unit>\n"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputEvent {
    /// Identity of the firing unit.
    pub unit: u64,
    /// Fixed message shared by all units.
    pub message: Arc<str>,
}

impl OutputEvent {
    /// Creates an event for `unit`.
    pub fn new(unit: u64, message: Arc<str>) -> Self {
        Self { unit, message }
    }

    /// Renders the complete line, trailing newline included.
    ///
    /// Sinks write this buffer in one call so a line is never split across writes.
    pub fn line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.message, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_newline_terminated() {
        let ev = OutputEvent::new(42, Arc::from("hello world!"));
        assert_eq!(ev.line(), "hello world! 42\n");
    }
}
