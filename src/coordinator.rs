//! The coordinator: rank 0. Never enumerates. Distributes the input
//! path, brokers donation requests, detects global termination, and
//! aggregates per-worker results.

use log::debug;

use crate::count_table::CountTable;
use crate::error::{EngineError, Result};
use crate::messages::{Payload, Tag, COORDINATOR_RANK};
use crate::transport::Transport;
use crate::worker::HelpStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerStatus {
    Running,
    Idle,
    Helping,
}

pub struct AggregateResult {
    pub counts: CountTable,
    pub stats: HelpStats,
}

pub struct Coordinator<'t, T: Transport> {
    transport: &'t T,
}

impl<'t, T: Transport> Coordinator<'t, T> {
    pub fn new(transport: &'t T) -> Self {
        Coordinator { transport }
    }

    pub fn run(&self, input_path: &str) -> Result<AggregateResult> {
        let world_size = self.transport.world_size();

        for rank in 1..world_size {
            self.transport
                .send(rank, Tag::FilePath, Payload::Text(input_path.to_string()))?;
        }

        // status[0] is unused (the coordinator does not enumerate); kept
        // so ranks index `status` directly.
        let mut status = vec![WorkerStatus::Running; world_size];
        status[COORDINATOR_RANK] = WorkerStatus::Idle;
        let mut active_count = world_size - 1;

        while active_count > 0 {
            let mut made_progress = false;

            if let Some(src) = self.transport.probe_any(Tag::SubtaskDone) {
                self.transport.recv(Tag::SubtaskDone, src)?;
                active_count -= 1;
                status[src] = WorkerStatus::Idle;
                debug!("coordinator: rank {src} signaled SUBTASK_DONE, active = {active_count}");
                made_progress = true;
            }

            if let Some(src) = self.transport.probe_any(Tag::HelpRequest) {
                self.transport.recv(Tag::HelpRequest, src)?;
                let helper = (1..world_size).find(|&r| status[r] == WorkerStatus::Idle);
                match helper {
                    Some(h) => {
                        status[h] = WorkerStatus::Helping;
                        active_count += 1;
                        self.transport
                            .send(src, Tag::HelpResponse, Payload::Scalar(h as i64))?;
                        debug!("coordinator: granted rank {src} helper {h}");
                    }
                    None => {
                        self.transport
                            .send(src, Tag::HelpResponse, Payload::Scalar(0))?;
                        debug!("coordinator: declined help request from rank {src}");
                    }
                }
                made_progress = true;
            }

            if !made_progress {
                std::thread::yield_now();
            }
        }

        for rank in 1..world_size {
            self.transport.send(rank, Tag::AllDone, Payload::Scalar(0))?;
        }
        debug!("coordinator: broadcast ALL_DONE");

        let mut totals = CountTable::new();
        let mut stats = HelpStats::default();
        for rank in 1..world_size {
            let counts = self.transport.recv(Tag::ResultCounts, rank)?;
            let pairs = counts.as_counts().ok_or(EngineError::Protocol {
                tag: Tag::ResultCounts,
                expected: "a sparse count table",
            })?;
            totals.merge(&CountTable::from_wire(pairs)?);

            stats.sent += self.read_stat(rank, Tag::StatSent)?;
            stats.accepted += self.read_stat(rank, Tag::StatAccepted)?;
            stats.rejected += self.read_stat(rank, Tag::StatRejected)?;
        }

        Ok(AggregateResult { counts: totals, stats })
    }

    fn read_stat(&self, rank: usize, tag: Tag) -> Result<u64> {
        let payload = self.transport.recv(tag, rank)?;
        payload
            .as_scalar()
            .map(|v| v as u64)
            .ok_or(EngineError::Protocol { tag, expected: "a scalar statistic" })
    }
}
