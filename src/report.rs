//! Result formatting and log-file append. Both are external
//! collaborators: they consume the finished `AggregateResult`, they
//! don't participate in the engine's invariants.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::coordinator::AggregateResult;
use crate::error::{EngineError, Result};

pub struct RunSummary {
    pub num_processes: usize,
    pub threshold: u64,
    pub elapsed_seconds: f64,
    pub result: AggregateResult,
}

impl RunSummary {
    fn total_cliques(&self) -> u64 {
        self.result.counts.iter().filter(|&(k, _)| k >= 3).map(|(_, c)| c).sum()
    }

    /// `num_processes, threshold, elapsed_seconds, total_cliques,
    /// help_sent, help_accepted, help_rejected`, tab-separated.
    pub fn log_line(&self) -> String {
        format!(
            "{}\t{}\t{:.6}\t{}\t{}\t{}\t{}",
            self.num_processes,
            self.threshold,
            self.elapsed_seconds,
            self.total_cliques(),
            self.result.stats.sent,
            self.result.stats.accepted,
            self.result.stats.rejected,
        )
    }

    pub fn stdout_summary(&self, verbose: bool) -> String {
        let mut out = format!("Total number of cliques: {}\n", self.total_cliques());
        if verbose {
            for (size, count) in self.result.counts.iter().filter(|&(k, _)| k >= 2) {
                out.push_str(&format!("  count[{size}] = {count}\n"));
            }
        }
        out
    }
}

pub fn append_log(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| EngineError::InputIo {
            path: path.display().to_string(),
            source,
        })?;
    writeln!(file, "{}", summary.log_line()).map_err(|source| EngineError::InputIo {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count_table::CountTable;
    use crate::worker::HelpStats;

    fn summary() -> RunSummary {
        let mut counts = CountTable::new();
        counts.add(3, 4);
        counts.add(4, 1);
        RunSummary {
            num_processes: 4,
            threshold: 5,
            elapsed_seconds: 0.25,
            result: AggregateResult {
                counts,
                stats: HelpStats { sent: 2, accepted: 1, rejected: 1 },
            },
        }
    }

    #[test]
    fn log_line_is_tab_separated_in_order() {
        let line = summary().log_line();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], "4");
        assert_eq!(fields[3], "5");
    }

    #[test]
    fn stdout_summary_reports_total() {
        let out = summary().stdout_summary(false);
        assert_eq!(out.trim(), "Total number of cliques: 5");
    }

    #[test]
    fn verbose_summary_includes_breakdown() {
        let out = summary().stdout_summary(true);
        assert!(out.contains("count[3] = 4"));
        assert!(out.contains("count[4] = 1"));
    }
}
