//! # Bench: fan-out, liveness gate, and the optional shutdown path.
//!
//! The [`Bench`] owns the event bus, the [`SubscriberSet`], the shared sink and
//! the run configuration. It spawns the units, then parks on the
//! [`LivenessGate`].
//!
//! ## High-level architecture
//! ```text
//! run():
//!   spawn()
//!     ├─► Bus.publish(FanOutStarting)
//!     ├─► Spawner::spawn_shared(N) | Spawner::spawn_per_core(N, workers)
//!     │      unit i ──► WorkUnit::run(child token i) ──► Sink::write per tick
//!     └─► Bus.publish(FanOutCompleted{ units, elapsed })
//!   arm_release()            (only with ShutdownMode::OnSignal or run_for > 0)
//!   Bus.publish(GateEngaged)
//!   gate.wait()              ◄── default run: never returns
//!
//! Shutdown path (gate released by signal, run limit or Bench::release):
//!   Bus.publish(ShutdownRequested)
//!   runtime_token.cancel()  → every unit's child token
//!   timeout(grace, FanOut::join()):
//!      ├─ Ok  → Sink::flush() → Bus.publish(AllStoppedWithin) → Ok(Report)
//!      └─ Err → Bus.publish(GraceExceeded) → Err(RuntimeError::GraceExceeded)
//!   drain_events(): listener forwards what is buffered, subscriber queues are drained
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tickfan::{Bench, Config, LogWriter, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tickfan::RuntimeError> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let bench = Bench::builder(Config::default()).with_subscribers(subs).build();
//!
//!     // Runs until the process is killed.
//!     bench.run().await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::{
    builder::BenchBuilder,
    config::{Config, ShutdownMode, Topology},
    gate::LivenessGate,
    shutdown,
    spawner::{FanOut, Spawner},
};
use crate::{
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    sinks::SinkRef,
    subscribers::SubscriberSet,
};

/// Summary of a run that went through the shutdown path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    /// Units spawned.
    pub units: u64,
    /// Wall time spent spawning them.
    pub spawn_elapsed: Duration,
    /// Firings across all units.
    pub firings: u64,
}

/// Coordinates the fan-out, the liveness gate and event delivery.
pub struct Bench {
    cfg: Config,
    bus: Bus,
    sink: SinkRef,
    /// Parent of every unit token; cancelled on shutdown.
    runtime_token: CancellationToken,
    /// Holds the liveness gate closed.
    gate_token: CancellationToken,
    /// Tells the event listener to forward what is left and stop.
    listener_token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Bench {
    /// Returns a builder for configuring the bench.
    pub fn builder(cfg: Config) -> BenchBuilder {
        BenchBuilder::new(cfg)
    }

    /// Must be called from within a tokio runtime.
    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: SubscriberSet,
        sink: SinkRef,
        runtime_token: CancellationToken,
        gate_token: CancellationToken,
    ) -> Self {
        let listener_token = CancellationToken::new();
        let listener = if subs.is_empty() {
            None
        } else {
            Some(Self::subscriber_listener(&bus, subs, listener_token.clone()))
        };

        Self {
            cfg,
            bus,
            sink,
            runtime_token,
            gate_token,
            listener_token,
            listener: Mutex::new(listener),
        }
    }

    /// Run configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus shared with units and sinks.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The liveness gate [`run`](Self::run) parks on.
    pub fn gate(&self) -> LivenessGate {
        LivenessGate::new(self.gate_token.clone())
    }

    /// Releases the liveness gate, sending [`run`](Self::run) down the shutdown path.
    ///
    /// For embedding and tests. The default binary never calls it.
    pub fn release(&self) {
        self.gate_token.cancel();
    }

    /// Spawns every unit and returns without waiting for any of them.
    pub fn spawn(&self) -> Result<FanOut, RuntimeError> {
        self.cfg.validate()?;
        let units = self.cfg.units;
        self.bus.publish(Event::new(EventKind::FanOutStarting).with_units(units));

        let spawner = Spawner::new(
            self.cfg.unit_params(),
            self.sink.clone(),
            self.bus.clone(),
            self.runtime_token.clone(),
        );
        let fanout = match self.cfg.topology {
            Topology::Shared => spawner.spawn_shared(units),
            Topology::PerCore => spawner.spawn_per_core(units, self.cfg.worker_count())?,
        };

        self.bus.publish(
            Event::new(EventKind::FanOutCompleted)
                .with_units(units)
                .with_elapsed(fanout.spawn_elapsed()),
        );
        Ok(fanout)
    }

    /// Spawns every unit, then blocks on the liveness gate.
    ///
    /// With the default configuration this never returns. It returns only
    /// after the gate is released (signal, run limit, [`release`](Self::release))
    /// and the shutdown path completes, or when spawning fails. Either way every
    /// subscriber has handled every event of the run by the time it returns.
    pub async fn run(&self) -> Result<Report, RuntimeError> {
        let res = self.run_until_released().await;
        self.drain_events().await;
        res
    }

    async fn run_until_released(&self) -> Result<Report, RuntimeError> {
        let mut fanout = self.spawn()?;
        if let Err(e) = self.arm_release() {
            self.runtime_token.cancel();
            return Err(e);
        }

        self.bus.publish(Event::new(EventKind::GateEngaged));
        self.gate().wait().await;

        self.shutdown(&mut fanout).await
    }

    /// Forwards bus events to the subscriber set until `stop` is cancelled, then
    /// forwards whatever is still buffered and shuts the set down.
    fn subscriber_listener(
        bus: &Bus,
        set: SubscriberSet,
        stop: CancellationToken,
    ) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit(&ev),
                                Err(TryRecvError::Lagged(skipped)) => {
                                    tracing::warn!(skipped, "event listener lagged");
                                }
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        })
    }

    /// Hands every event published so far to the subscribers and waits for them.
    async fn drain_events(&self) {
        self.listener_token.cancel();
        let listener = self.listener.lock().await.take();
        if let Some(handle) = listener {
            let _ = handle.await;
        }
    }

    /// Installs whatever may release the gate besides [`release`](Self::release).
    fn arm_release(&self) -> Result<(), RuntimeError> {
        if self.cfg.shutdown == ShutdownMode::OnSignal {
            let signal = shutdown::shutdown_signal().map_err(|e| RuntimeError::Signal {
                error: e.to_string(),
            })?;
            let gate = self.gate_token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = signal => gate.cancel(),
                    _ = gate.cancelled() => {}
                }
            });
        }

        if let Some(limit) = self.cfg.run_limit() {
            let gate = self.gate_token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = time::sleep(limit) => gate.cancel(),
                    _ = gate.cancelled() => {}
                }
            });
        }
        Ok(())
    }

    /// Cancels all units and waits up to [`Config::grace`] for them to exit.
    async fn shutdown(&self, fanout: &mut FanOut) -> Result<Report, RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.runtime_token.cancel();

        let grace = self.cfg.grace;
        match time::timeout(grace, fanout.join()).await {
            Ok(firings) => {
                if let Err(e) = self.sink.flush().await {
                    self.bus.publish(
                        Event::new(EventKind::SinkFlushFailed)
                            .with_name(self.sink.name())
                            .with_reason(e.to_string()),
                    );
                }
                self.bus.publish(
                    Event::new(EventKind::AllStoppedWithin).with_units(fanout.len() as u64),
                );
                Ok(Report {
                    units: self.cfg.units,
                    spawn_elapsed: fanout.spawn_elapsed(),
                    firings,
                })
            }
            Err(_elapsed) => {
                let pending = fanout.pending();
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_units(pending as u64),
                );
                Err(RuntimeError::GraceExceeded { grace, pending })
            }
        }
    }
}
