//! Command-line surface. `-h` is spoken for here (donation enable/
//! disable), so the auto-generated `--help`/`-h` is disabled in favor
//! of it; this is the one flag whose natural letter collides with
//! clap's defaults.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "parclique",
    about = "Distributed clique census over an undirected graph, balanced by runtime work donation.",
    disable_help_flag = true
)]
pub struct Cli {
    /// Dataset label (used only for the log line / default output naming).
    #[arg(short = 'd', long = "dataset")]
    pub dataset: Option<String>,

    /// Path to the tab-separated edge list. Overrides `-d` when both are
    /// given.
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Enable work donation between workers (0 or 1).
    #[arg(short = 'h', long = "donate", default_value_t = 1)]
    pub donate: u8,

    /// Override the donation threshold; if omitted it is computed from
    /// the graph.
    #[arg(short = 't', long = "threshold")]
    pub threshold: Option<u64>,

    /// Verbose output (0 or 1): raises the log filter and prints the
    /// full per-size count breakdown, not just the total.
    #[arg(short = 'v', long = "verbose", default_value_t = 0)]
    pub verbose: u8,

    /// Log file path, or `1` for the default path.
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Number of worker processes to stand up (ranks 1..=workers); this
    /// repository has no external `mpirun`-style launcher, so the CLI
    /// itself supplies the worker count instead of an external one.
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,
}

impl Cli {
    /// Resolves the edge-list path: `-f` wins outright; otherwise `-d`
    /// names a dataset under `datasets/<name>.tsv`. Exactly one of the
    /// two must be supplied.
    pub fn input_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.file {
            return Ok(path.clone());
        }
        if let Some(dataset) = &self.dataset {
            return Ok(PathBuf::from(format!("datasets/{dataset}.tsv")));
        }
        anyhow::bail!("either -f/--file or -d/--dataset must be supplied")
    }

    pub fn donation_enabled(&self) -> bool {
        self.donate != 0
    }

    pub fn verbose_enabled(&self) -> bool {
        self.verbose != 0
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        match self.output.as_deref() {
            None => None,
            Some("1") => Some(PathBuf::from("parclique.log")),
            Some(path) => Some(PathBuf::from(path)),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().saturating_sub(1))
            .max(1)
    }
}
