#![cfg(unix)]

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use tickfan::{Bench, Config, EventKind, LockedSink, ShutdownMode};

// Lives in its own test binary: once the handler is installed, SIGTERM no
// longer kills the process.
#[tokio::test]
async fn termination_signal_takes_the_graceful_path() {
    let cfg = Config {
        units: 4,
        period: Duration::from_millis(5),
        shutdown: ShutdownMode::OnSignal,
        grace: Duration::from_secs(1),
        ..Config::default()
    };
    let sink = Arc::new(LockedSink::new(Vec::new()));
    let bench = Bench::builder(cfg).with_sink(sink.clone()).build();
    let mut events = bench.bus().subscribe();

    let runner = Arc::clone(&bench);
    let run = tokio::spawn(async move { runner.run().await });

    // GateEngaged is published after the signal listeners are registered.
    while events.recv().await.unwrap().kind != EventKind::GateEngaged {}
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!run.is_finished());

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let report = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("signal did not release the gate")
        .unwrap()
        .unwrap();
    assert_eq!(report.units, 4);
    assert!(report.firings > 0);

    let lines = sink.inspect(|buf| buf.iter().filter(|b| **b == b'\n').count()).await;
    assert_eq!(lines as u64, report.firings);
}
