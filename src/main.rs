//! tickfan - fan-out scheduling benchmark
//!
//! Spawns N units that each print `<message> <id>` on stdout every period,
//! then parks forever. Diagnostics go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use tickfan::{Bench, LogWriter, Subscribe, Topology};

mod cli;

use cli::CliArgs;

fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose, args.quiet)?;

    let cfg = args.to_config();
    cfg.validate()?;

    // Per-core partitions bring their own threads; the main runtime only hosts the gate.
    let threads = match cfg.topology {
        Topology::Shared => cfg.worker_count(),
        Topology::PerCore => 1,
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .thread_name("tickfan-worker")
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let report = runtime.block_on(async move {
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
        let bench = Bench::builder(cfg).with_subscribers(subs).build();

        let cfg = bench.config();
        info!(
            units = cfg.units,
            period_ms = cfg.period.as_millis() as u64,
            topology = ?cfg.topology,
            sink = ?cfg.sink,
            workers = cfg.worker_count(),
            "starting tickfan"
        );
        bench.run().await
    })?;

    info!(
        units = report.units,
        spawn_ms = report.spawn_elapsed.as_millis() as u64,
        firings = report.firings,
        "run complete"
    );
    Ok(())
}

/// Reports a fatal error through tracing, or straight to stderr when logging
/// never came up.
fn report_error(e: &anyhow::Error) -> bool {
    if tracing::dispatcher::has_been_set() {
        error!("Error: {:#}", e);
        true
    } else {
        eprintln!("Error: {e:#}");
        false
    }
}

fn main() {
    if let Err(e) = run() {
        report_error(&e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_reach_stderr_without_a_subscriber() {
        let err = anyhow::anyhow!("failed to set tracing subscriber");
        assert!(!report_error(&err));
    }
}
