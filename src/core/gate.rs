//! # Liveness gate.
//!
//! Parks the spawning path after the fan-out so the process stays up while the
//! units run. Waiting is a plain await on a [`CancellationToken`]: the task is
//! descheduled and costs nothing until the token is cancelled.
//!
//! In the default run nothing ever cancels the token, so [`LivenessGate::wait`]
//! never returns and only killing the process ends the benchmark.

use tokio_util::sync::CancellationToken;

/// Zero-cost indefinite suspension point.
#[derive(Clone, Debug)]
pub struct LivenessGate {
    token: CancellationToken,
}

impl LivenessGate {
    /// Creates a gate held closed by `token`.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Suspends until the gate is released.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Returns `true` once the gate has been released.
    pub fn is_released(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn blocks_until_released() {
        let token = CancellationToken::new();
        let gate = LivenessGate::new(token.clone());

        let waited = tokio::time::timeout(Duration::from_secs(24 * 3600), gate.wait()).await;
        assert!(waited.is_err(), "gate must not open on its own");
        assert!(!gate.is_released());

        token.cancel();
        gate.wait().await;
        assert!(gate.is_released());
    }
}
