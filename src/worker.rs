//! Worker lifecycle: load the graph, run the initial partition, signal
//! completion, then stand by to receive donated work until `ALL_DONE`.

use std::cell::Cell;
use std::path::Path;

use log::{debug, info, trace};

use crate::count_table::CountTable;
use crate::donation::DonationFrame;
use crate::enumerator::{CliqueEnumerator, HelpChannel};
use crate::error::{EngineError, Result};
use crate::graph::Node;
use crate::ingest;
use crate::messages::{Payload, Tag, COORDINATOR_RANK};
use crate::transport::Transport;

#[derive(Debug, Default)]
pub struct HelpStats {
    pub sent: u64,
    pub accepted: u64,
    pub rejected: u64,
}

pub struct WorkerReport {
    pub counts: CountTable,
    pub stats: HelpStats,
    pub threshold: u64,
}

pub struct Worker<'t, T: Transport> {
    transport: &'t T,
    donation_enabled: bool,
    threshold_override: Option<u64>,
    sent: Cell<u64>,
    accepted: Cell<u64>,
    rejected: Cell<u64>,
}

impl<'t, T: Transport> Worker<'t, T> {
    pub fn new(transport: &'t T, donation_enabled: bool, threshold_override: Option<u64>) -> Self {
        Worker {
            transport,
            donation_enabled,
            threshold_override,
            sent: Cell::new(0),
            accepted: Cell::new(0),
            rejected: Cell::new(0),
        }
    }

    pub fn run(&self) -> Result<WorkerReport> {
        let rank = self.transport.rank();

        let path_payload = self.transport.recv(Tag::FilePath, COORDINATOR_RANK)?;
        let path = path_payload.as_text().ok_or(EngineError::Protocol {
            tag: Tag::FilePath,
            expected: "a UTF-8 file path",
        })?;
        info!("worker {rank}: loading graph from {path}");
        let graph = ingest::load_graph(Path::new(path))?;

        let threshold = self
            .threshold_override
            .unwrap_or_else(|| graph.donation_threshold());
        debug!("worker {rank}: donation threshold = {threshold}");

        let mut enumerator = CliqueEnumerator::new(&graph, self.donation_enabled, threshold);

        let num_workers = self.transport.world_size() - 1;
        let mut bases: Vec<Node> = graph
            .nodes()
            .filter(|&s| (s as usize) % num_workers == rank - 1)
            .collect();
        bases.sort_unstable();
        debug!("worker {rank}: assigned {} base nodes", bases.len());

        enumerator.run_partition(&bases, self);
        self.transport
            .send(COORDINATOR_RANK, Tag::SubtaskDone, Payload::Scalar(0))?;
        debug!("worker {rank}: initial partition complete, entering help-standby");

        loop {
            if self.transport.probe_any(Tag::AllDone).is_some() {
                self.transport.recv(Tag::AllDone, COORDINATOR_RANK)?;
                break;
            }
            if let Some(donor) = self.transport.probe_any(Tag::DonationDepth) {
                let frame = self.receive_frame(donor)?;
                trace!(
                    "worker {rank}: running donated frame from {donor} (depth {}, {} candidates)",
                    frame.depth,
                    frame.remaining()
                );
                enumerator.run_frame(frame, self);
                self.transport
                    .send(COORDINATOR_RANK, Tag::SubtaskDone, Payload::Scalar(0))?;
            } else {
                std::thread::yield_now();
            }
        }

        info!(
            "worker {rank}: done (sent {}, accepted {}, rejected {})",
            self.sent.get(),
            self.accepted.get(),
            self.rejected.get()
        );

        let counts = enumerator.into_counts();
        self.transport.send(
            COORDINATOR_RANK,
            Tag::ResultCounts,
            Payload::Counts(counts.to_wire()?),
        )?;
        self.transport.send(
            COORDINATOR_RANK,
            Tag::StatSent,
            Payload::Scalar(self.sent.get() as i64),
        )?;
        self.transport.send(
            COORDINATOR_RANK,
            Tag::StatAccepted,
            Payload::Scalar(self.accepted.get() as i64),
        )?;
        self.transport.send(
            COORDINATOR_RANK,
            Tag::StatRejected,
            Payload::Scalar(self.rejected.get() as i64),
        )?;

        Ok(WorkerReport {
            counts,
            stats: HelpStats {
                sent: self.sent.get(),
                accepted: self.accepted.get(),
                rejected: self.rejected.get(),
            },
            threshold,
        })
    }

    fn receive_frame(&self, donor: usize) -> Result<DonationFrame> {
        let protocol_err = |tag| EngineError::Protocol {
            tag,
            expected: "a well-formed donation message",
        };

        let depth = self
            .transport
            .recv(Tag::DonationDepth, donor)?
            .as_scalar()
            .ok_or_else(|| protocol_err(Tag::DonationDepth))?;
        let start = self
            .transport
            .recv(Tag::DonationStart, donor)?
            .as_scalar()
            .ok_or_else(|| protocol_err(Tag::DonationStart))?;
        let end = self
            .transport
            .recv(Tag::DonationEnd, donor)?
            .as_scalar()
            .ok_or_else(|| protocol_err(Tag::DonationEnd))?;
        let base = self
            .transport
            .recv(Tag::DonationBase, donor)?
            .as_nodes()
            .ok_or_else(|| protocol_err(Tag::DonationBase))?
            .to_vec();
        let candidates = self
            .transport
            .recv(Tag::DonationCandidates, donor)?
            .as_nodes()
            .ok_or_else(|| protocol_err(Tag::DonationCandidates))?
            .to_vec();

        Ok(DonationFrame::new(
            depth as usize,
            base,
            candidates,
            start as usize,
            end as usize,
        ))
    }
}

impl<'t, T: Transport> HelpChannel for Worker<'t, T> {
    fn request_help(&self) -> Option<usize> {
        self.sent.set(self.sent.get() + 1);
        self.transport
            .send(COORDINATOR_RANK, Tag::HelpRequest, Payload::Scalar(0))
            .expect("transport send failed for HELP_REQUEST");
        let response = self
            .transport
            .recv(Tag::HelpResponse, COORDINATOR_RANK)
            .expect("transport recv failed for HELP_RESPONSE");
        match response.as_scalar() {
            Some(0) => {
                self.rejected.set(self.rejected.get() + 1);
                None
            }
            Some(helper) if helper > 0 => {
                self.accepted.set(self.accepted.get() + 1);
                Some(helper as usize)
            }
            _ => panic!("protocol error: malformed HELP_RESPONSE payload"),
        }
    }

    fn donate(&self, frame: DonationFrame, helper: usize) {
        self.transport
            .send(helper, Tag::DonationDepth, Payload::Scalar(frame.depth as i64))
            .expect("transport send failed for DONATION_DEPTH");
        self.transport
            .send(helper, Tag::DonationStart, Payload::Scalar(frame.start as i64))
            .expect("transport send failed for DONATION_START");
        self.transport
            .send(helper, Tag::DonationEnd, Payload::Scalar(frame.end as i64))
            .expect("transport send failed for DONATION_END");
        self.transport
            .send(helper, Tag::DonationBase, Payload::Nodes(frame.base))
            .expect("transport send failed for DONATION_BASE");
        self.transport
            .send(
                helper,
                Tag::DonationCandidates,
                Payload::Nodes(frame.candidates),
            )
            .expect("transport send failed for DONATION_CANDIDATES");
    }
}
