//! # Spawner: fan-out of N work units.
//!
//! Creates units `0..N` and hands each one to the scheduler immediately. The
//! spawner never awaits a unit, so spawning costs O(N) regardless of the period.
//!
//! ## Topologies
//! ```text
//! Shared:
//!   spawn_shared(N) ──► JoinSet ──► tokio multi-thread runtime (workers threads)
//!                        unit 0, unit 1, ... unit N-1
//!
//! PerCore:
//!   partition(N, workers) ──► [0..a) [a..b) ... [y..N)
//!                               │      │          │
//!                            thread  thread  ... thread      (one current-thread runtime each)
//!                               │      │          │
//!                            JoinSet JoinSet    JoinSet ──► done channel (firings per partition)
//! ```
//!
//! ## Rules
//! - Every unit gets a **child token** of the root token; cancelling one stops one trigger.
//! - Identities are **dense and unique**: per-core slices partition `0..N` exactly.
//! - Failure to create a thread or runtime is **fatal**: already running units are
//!   cancelled and the error is returned.

use std::ops::Range;
use std::thread;
use std::time::{Duration, Instant};

use tokio::{runtime, sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    error::RuntimeError,
    events::Bus,
    sinks::SinkRef,
    units::{UnitParams, WorkUnit},
};

/// Creates work units and starts them.
#[derive(Clone)]
pub struct Spawner {
    params: UnitParams,
    sink: SinkRef,
    bus: Bus,
    root: CancellationToken,
    thread_stack: Option<usize>,
}

impl Spawner {
    /// Creates a spawner whose units run under children of `root`.
    pub fn new(params: UnitParams, sink: SinkRef, bus: Bus, root: CancellationToken) -> Self {
        Self {
            params,
            sink,
            bus,
            root,
            thread_stack: None,
        }
    }

    /// Sets the stack size of per-core partition threads (default: the std default).
    pub fn with_thread_stack(mut self, bytes: usize) -> Self {
        self.thread_stack = Some(bytes);
        self
    }

    /// Spawns `units` units onto the current runtime.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_shared(&self, units: u64) -> FanOut {
        let started = Instant::now();
        let mut set = JoinSet::new();
        let mut tokens = Vec::with_capacity(units as usize);

        for id in 0..units {
            let token = self.root.child_token();
            set.spawn(self.unit(id).run(token.clone()));
            tokens.push(token);
        }

        FanOut {
            tokens,
            units: Units::Shared(set),
            spawn_elapsed: started.elapsed(),
            firings: 0,
        }
    }

    /// Spawns `units` units across `workers` dedicated threads.
    ///
    /// Each partition thread builds its own scheduler; this call blocks until
    /// every started partition has reported whether that succeeded.
    pub fn spawn_per_core(&self, units: u64, workers: usize) -> Result<FanOut, RuntimeError> {
        let started = Instant::now();
        let tokens: Vec<CancellationToken> = (0..units).map(|_| self.root.child_token()).collect();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        let ranges = partition(units, workers);
        let partitions = ranges.len();

        for (idx, range) in ranges.into_iter().enumerate() {
            let first = range.start;
            let slice: Vec<(u64, CancellationToken)> = range
                .map(|id| (id, tokens[id as usize].clone()))
                .collect();

            let launched = self.start_partition(idx, slice, ready_tx.clone(), done_tx.clone());
            if let Err(error) = launched {
                self.root.cancel();
                return Err(RuntimeError::SpawnFailed { unit: first, error });
            }
        }
        drop(ready_tx);

        for _ in 0..partitions {
            let built = ready_rx
                .recv()
                .unwrap_or_else(|_| Err("partition thread exited during startup".to_string()));
            if let Err(error) = built {
                self.root.cancel();
                return Err(RuntimeError::RuntimeBuild { error });
            }
        }

        Ok(FanOut {
            tokens,
            units: Units::PerCore {
                done: done_rx,
                pending: partitions,
            },
            spawn_elapsed: started.elapsed(),
            firings: 0,
        })
    }

    /// Starts one partition thread. The scheduler is built on that thread, so a
    /// failed thread spawn never drops a runtime on the caller's thread.
    fn start_partition(
        &self,
        idx: usize,
        slice: Vec<(u64, CancellationToken)>,
        ready: Ready,
        done: mpsc::UnboundedSender<u64>,
    ) -> Result<(), String> {
        let spawner = self.clone();
        let mut builder = thread::Builder::new().name(format!("tickfan-core-{idx}"));
        if let Some(bytes) = self.thread_stack {
            builder = builder.stack_size(bytes);
        }

        builder
            .spawn(move || {
                let rt = match runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(rt) => rt,
                    Err(e) => {
                        let _ = ready.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready.send(Ok(()));

                let firings = rt.block_on(async move {
                    let mut set = JoinSet::new();
                    for (id, token) in slice {
                        set.spawn(spawner.unit(id).run(token));
                    }
                    let mut firings = 0;
                    while let Some(res) = set.join_next().await {
                        firings += res.unwrap_or(0);
                    }
                    firings
                });
                let _ = done.send(firings);
            })
            .map(|_detached| ())
            .map_err(|e| e.to_string())
    }

    fn unit(&self, id: u64) -> WorkUnit {
        WorkUnit::new(id, self.params.clone(), self.sink.clone(), self.bus.clone())
    }
}

/// Startup report of one partition: `Err` carries the scheduler build error.
type Ready = std::sync::mpsc::Sender<Result<(), String>>;

enum Units {
    Shared(JoinSet<u64>),
    PerCore {
        done: mpsc::UnboundedReceiver<u64>,
        pending: usize,
    },
}

/// Handle to a running fan-out.
///
/// Dropping a shared-topology `FanOut` aborts its units; per-core partitions
/// keep running until the root token is cancelled.
pub struct FanOut {
    tokens: Vec<CancellationToken>,
    units: Units,
    spawn_elapsed: Duration,
    firings: u64,
}

impl FanOut {
    /// Number of units spawned.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no unit was spawned.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Wall time spent creating the units.
    pub fn spawn_elapsed(&self) -> Duration {
        self.spawn_elapsed
    }

    /// Stops the trigger of unit `id`. Returns `false` for an unknown id.
    pub fn stop_unit(&self, id: u64) -> bool {
        match usize::try_from(id).ok().and_then(|i| self.tokens.get(i)) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Units (shared) or partitions (per-core) that have not exited yet.
    pub fn pending(&self) -> usize {
        match &self.units {
            Units::Shared(set) => set.len(),
            Units::PerCore { pending, .. } => *pending,
        }
    }

    /// Waits for every unit to exit and returns the total number of firings.
    ///
    /// Units exit only when their token is cancelled. Cancel-safe: progress is
    /// kept if the future is dropped, so it can be raced against a grace timer.
    pub async fn join(&mut self) -> u64 {
        match &mut self.units {
            Units::Shared(set) => {
                while let Some(res) = set.join_next().await {
                    self.firings += res.unwrap_or(0);
                }
            }
            Units::PerCore { done, pending } => {
                while *pending > 0 {
                    match done.recv().await {
                        Some(n) => {
                            self.firings += n;
                            *pending -= 1;
                        }
                        None => break,
                    }
                }
            }
        }
        self.firings
    }
}

/// Splits `0..units` into at most `parts` contiguous, non-empty ranges whose
/// lengths differ by at most one.
pub(crate) fn partition(units: u64, parts: usize) -> Vec<Range<u64>> {
    let parts = (parts.max(1) as u64).min(units);
    if parts == 0 {
        return Vec::new();
    }
    let base = units / parts;
    let extra = units % parts;

    let mut start = 0;
    (0..parts)
        .map(|i| {
            let len = base + u64::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::sinks::{OutputEvent, Sink};
    use crate::units::Trigger;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Tally {
        per_unit: Mutex<HashMap<u64, u64>>,
    }

    impl Tally {
        fn count(&self, unit: u64) -> u64 {
            self.per_unit.lock().unwrap().get(&unit).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl Sink for Tally {
        async fn write(&self, ev: &OutputEvent) -> Result<(), SinkError> {
            *self.per_unit.lock().unwrap().entry(ev.unit).or_default() += 1;
            Ok(())
        }
    }

    fn spawner(period: Duration, sink: Arc<Tally>, root: &CancellationToken) -> Spawner {
        let params = UnitParams {
            trigger: Trigger::new(period),
            message: Arc::from("hello world!"),
        };
        Spawner::new(params, sink, Bus::new(16), root.clone())
    }

    #[test]
    fn partition_covers_every_id_once() {
        let ranges = partition(10, 3);
        assert_eq!(ranges, vec![0..4, 4..7, 7..10]);

        let ids: Vec<u64> = partition(100_000, 7).into_iter().flatten().collect();
        assert_eq!(ids, (0..100_000).collect::<Vec<_>>());
    }

    #[test]
    fn partition_never_yields_empty_ranges() {
        assert!(partition(0, 4).is_empty());
        assert_eq!(partition(2, 8), vec![0..1, 1..2]);
        assert_eq!(partition(5, 0), vec![0..5]);
    }

    #[tokio::test(start_paused = true)]
    async fn spawning_does_not_wait_for_units() {
        let root = CancellationToken::new();
        let sink = Arc::new(Tally::default());
        let before = tokio::time::Instant::now();

        let mut fanout =
            spawner(Duration::from_secs(3600), sink.clone(), &root).spawn_shared(10_000);

        assert_eq!(fanout.len(), 10_000);
        assert_eq!(tokio::time::Instant::now(), before);
        assert_eq!(fanout.pending(), 10_000);

        root.cancel();
        assert_eq!(fanout.join().await, 0);
        assert_eq!(fanout.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_unit_silences_exactly_one_trigger() {
        let root = CancellationToken::new();
        let sink = Arc::new(Tally::default());
        let mut fanout = spawner(Duration::from_millis(10), sink.clone(), &root).spawn_shared(3);

        tokio::time::sleep(Duration::from_millis(55)).await;
        assert!(fanout.stop_unit(1));
        assert!(!fanout.stop_unit(3));
        tokio::time::sleep(Duration::from_millis(50)).await;
        root.cancel();
        let total = fanout.join().await;

        assert_eq!(sink.count(1), 5);
        assert_eq!(sink.count(0), 10);
        assert_eq!(sink.count(2), 10);
        assert_eq!(total, 25);
    }

    #[tokio::test]
    async fn per_core_partitions_share_one_sink() {
        let root = CancellationToken::new();
        let sink = Arc::new(Tally::default());
        let mut fanout = spawner(Duration::from_millis(5), sink.clone(), &root)
            .spawn_per_core(8, 3)
            .unwrap();
        assert_eq!(fanout.len(), 8);
        assert_eq!(fanout.pending(), 3);

        tokio::time::sleep(Duration::from_millis(100)).await;
        root.cancel();
        let total = fanout.join().await;

        assert_eq!(fanout.pending(), 0);
        for unit in 0..8 {
            assert!(sink.count(unit) > 0, "unit {unit} never fired");
        }
        assert_eq!(total, (0..8).map(|u| sink.count(u)).sum::<u64>());
    }

    #[cfg(target_pointer_width = "64")]
    #[tokio::test]
    async fn failed_partition_thread_is_fatal() {
        let root = CancellationToken::new();
        let sink = Arc::new(Tally::default());

        // No address space can hold this stack, so the first thread spawn fails.
        let res = spawner(Duration::from_millis(5), sink.clone(), &root)
            .with_thread_stack(1 << 52)
            .spawn_per_core(8, 2);

        match res {
            Err(RuntimeError::SpawnFailed { unit, .. }) => assert_eq!(unit, 0),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("partition thread must not start"),
        }
        assert!(root.is_cancelled());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(sink.count(0), 0);
    }
}
