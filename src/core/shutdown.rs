//! # Cross-platform termination signals.
//!
//! Only armed with [`ShutdownMode::OnSignal`](crate::ShutdownMode::OnSignal).
//! In the default mode no handler is installed, so a signal keeps its OS
//! default action and ends the process directly.
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`
//!
//! **Other platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::future::Future;

/// Registers the listeners and returns a future that completes on the first signal.
///
/// Registration happens before this function returns, so a registration
/// failure is reported up front instead of from inside a background task.
#[cfg(unix)]
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    Ok(async move {
        tokio::select! {
            _ = sigint.recv()  => {},
            _ = sigterm.recv() => {},
            _ = sigquit.recv() => {},
        }
    })
}

/// Registers the listener and returns a future that completes on the first signal.
#[cfg(not(unix))]
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}
