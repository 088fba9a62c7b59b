use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;

use parclique::cli::Cli;
use parclique::coordinator::Coordinator;
use parclique::report::{append_log, RunSummary};
use parclique::transport::channel_fleet;
use parclique::worker::Worker;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose_enabled() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let num_workers = cli.worker_count();
    let world_size = num_workers + 1;
    let fleet = channel_fleet(world_size);

    let mut transports = fleet.into_iter();
    let coordinator_transport = transports.next().expect("fleet always has a coordinator slot");
    let worker_transports: Vec<_> = transports.collect();

    let file_path = cli.input_path()?.to_string_lossy().into_owned();
    let donation_enabled = cli.donation_enabled();
    let threshold_override = cli.threshold;

    let start = Instant::now();

    let handles: Vec<_> = worker_transports
        .into_iter()
        .map(|transport| {
            std::thread::spawn(move || {
                let worker = Worker::new(&transport, donation_enabled, threshold_override);
                worker.run()
            })
        })
        .collect();

    // The coordinator never blocks on a worker directly: it spins on
    // non-blocking probes until every worker has gone idle. A worker
    // whose ingestion failed never sends SUBTASK_DONE, so this call
    // hangs in that case — an accepted, documented limitation, not a
    // bug to paper over here.
    let coordinator = Coordinator::new(&coordinator_transport);
    let result = coordinator
        .run(&file_path)
        .context("coordinator brokering loop failed")?;

    let mut effective_threshold = threshold_override.unwrap_or(0);
    for handle in handles {
        match handle.join().expect("worker thread panicked") {
            Ok(report) => effective_threshold = report.threshold,
            Err(err) => error!("worker reported a fatal error: {err}"),
        }
    }

    let elapsed_seconds = start.elapsed().as_secs_f64();

    let summary = RunSummary {
        num_processes: world_size,
        threshold: effective_threshold,
        elapsed_seconds,
        result,
    };

    print!("{}", summary.stdout_summary(cli.verbose_enabled()));

    if let Some(log_path) = cli.log_path() {
        append_log(&log_path, &summary).context("failed to append run summary to log file")?;
    }

    Ok(())
}
