//! The Chiba–Nishizeki style, node-ordered DFS clique extender. This is
//! the core search: it enumerates every clique of size >= 3 in the
//! subtree of the search space it is handed exactly once, recording
//! sizes into a `CountTable`, and offers slices of remaining work to
//! other workers mid-search when the remaining width exceeds a
//! threshold.
//!
//! The enumerator never talks to the transport directly. It is handed a
//! narrow `&dyn HelpChannel` capability for the duration of one call:
//! this keeps the enumerator from needing a back-reference to its
//! owning worker.

use crate::count_table::CountTable;
use crate::donation::DonationFrame;
use crate::graph::{Graph, Node};

/// The capability a worker hands its enumerator so it can mediate
/// donation through the transport. `request_help` returns the rank that
/// accepted, or `None` if the coordinator had no idle worker to offer.
pub trait HelpChannel {
    fn request_help(&self) -> Option<usize>;
    fn donate(&self, frame: DonationFrame, helper: usize);
}

pub struct CliqueEnumerator<'g> {
    graph: &'g Graph,
    donation_enabled: bool,
    donation_threshold: u64,
    counts: CountTable,
}

impl<'g> CliqueEnumerator<'g> {
    pub fn new(graph: &'g Graph, donation_enabled: bool, donation_threshold: u64) -> Self {
        CliqueEnumerator {
            graph,
            donation_enabled,
            donation_threshold,
            counts: CountTable::new(),
        }
    }

    pub fn into_counts(self) -> CountTable {
        self.counts
    }

    /// Processes every base node this worker is responsible for in its
    /// initial partition.
    pub fn run_partition(&mut self, bases: &[Node], help: &dyn HelpChannel) {
        for &s in bases {
            let mut candidates: Vec<Node> = self
                .graph
                .neighbors(s)
                .iter()
                .copied()
                .filter(|&t| t > s)
                .collect();
            candidates.sort_unstable();

            if candidates.len() <= 1 {
                // Bare edges with no third common neighbor: the only
                // path that ever populates count[2].
                self.counts.add(2, candidates.len() as u64);
                continue;
            }

            let end = candidates.len();
            self.extend(3, &[s], &candidates, 0, end, help, false);
        }
    }

    /// Runs a `DonationFrame` received from a peer. The recursion guard
    /// suppresses exactly the first donation check this invocation would
    /// make, so a freshly helped worker cannot instantly re-donate the
    /// frame it was just given.
    pub fn run_frame(&mut self, frame: DonationFrame, help: &dyn HelpChannel) {
        let DonationFrame {
            depth,
            base,
            candidates,
            start,
            end,
        } = frame;
        self.extend(depth, &base, &candidates, start, end, help, true);
    }

    fn extend(
        &mut self,
        depth: usize,
        base: &[Node],
        candidates: &[Node],
        start: usize,
        end: usize,
        help: &dyn HelpChannel,
        suppress_first_donation: bool,
    ) {
        let mut i = start;
        let mut guard_armed = suppress_first_donation;

        while i < end {
            if !guard_armed
                && self.donation_enabled
                && (end - i) as u64 > self.donation_threshold
            {
                if let Some(helper) = help.request_help() {
                    let frame =
                        DonationFrame::new(depth, base.to_vec(), candidates.to_vec(), i, end);
                    help.donate(frame, helper);
                    return; // Scanning(i) -> Donated
                }
                // declined: fall through and continue locally at i.
            }
            guard_armed = false;

            let mut new_candidates = Vec::new();
            for j in (i + 1)..candidates.len() {
                if self.graph.is_edge(candidates[i], candidates[j]) {
                    new_candidates.push(candidates[j]);
                    self.counts.increment(depth);
                }
            }

            if new_candidates.len() > 1 {
                let mut new_base = Vec::with_capacity(base.len() + 1);
                new_base.extend_from_slice(base);
                new_base.push(candidates[i]);
                let new_end = new_candidates.len();
                self.extend(depth + 1, &new_base, &new_candidates, 0, new_end, help, false);
            }

            i += 1;
        }
    }
}
