//! The message-passing transport: ranked processes, point-to-point
//! send, blocking receive, non-blocking probe by `(source, tag)`. This
//! module supplies the interface (`Transport`) and the one concrete
//! realization this repository has any use for, `ChannelTransport` — a
//! thread-per-rank stand-in for the ranked OS processes an external
//! launcher would otherwise provide.
//!
//! FIFO ordering holds within any `(sender, receiver, tag)` pair because
//! each is backed by one `crossbeam_channel` per rank pair and a single
//! reader never reorders what it pulls from it. No ordering is assumed,
//! or needed, across distinct tags: `probe` is tag-filtered and a
//! pending buffer holds messages whose tag doesn't match yet without
//! dropping them.

use std::cell::RefCell;
use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender};

use crate::error::{EngineError, Result};
use crate::messages::{Payload, Tag};

struct Envelope {
    from: usize,
    tag: Tag,
    payload: Payload,
}

pub trait Transport {
    fn rank(&self) -> usize;
    fn world_size(&self) -> usize;

    fn send(&self, dest: usize, tag: Tag, payload: Payload) -> Result<()>;

    /// Non-blocking. If a message with this tag is waiting from any
    /// source, returns that source without consuming the message.
    fn probe_any(&self, tag: Tag) -> Option<usize>;

    /// Blocking. Consumes and returns the next message matching `tag`
    /// from `source` specifically.
    fn recv(&self, tag: Tag, source: usize) -> Result<Payload>;

    /// Blocking. Consumes and returns the next message matching `tag`
    /// from any source, along with that source.
    fn recv_any(&self, tag: Tag) -> Result<(usize, Payload)>;
}

pub struct ChannelTransport {
    rank: usize,
    peers: usize,
    inbox: Receiver<Envelope>,
    outboxes: Vec<Sender<Envelope>>,
    pending: RefCell<VecDeque<Envelope>>,
}

/// Builds a full mesh of channels for `world_size` ranks (coordinator
/// included) and returns one `ChannelTransport` per rank, indexed by
/// rank.
pub fn channel_fleet(world_size: usize) -> Vec<ChannelTransport> {
    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..world_size).map(|_| crossbeam_channel::unbounded()).unzip();

    receivers
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| ChannelTransport {
            rank,
            peers: world_size,
            inbox,
            outboxes: senders.clone(),
            pending: RefCell::new(VecDeque::new()),
        })
        .collect()
}

impl ChannelTransport {
    /// Drains everything immediately available on the inbox into the
    /// pending buffer, without blocking.
    fn drain_available(&self) {
        let mut pending = self.pending.borrow_mut();
        while let Ok(envelope) = self.inbox.try_recv() {
            pending.push_back(envelope);
        }
    }

    fn take_pending(&self, tag: Tag, source: Option<usize>) -> Option<Envelope> {
        let mut pending = self.pending.borrow_mut();
        let position = pending
            .iter()
            .position(|e| e.tag == tag && source.map_or(true, |s| e.from == s))?;
        pending.remove(position)
    }
}

impl Transport for ChannelTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.peers
    }

    fn send(&self, dest: usize, tag: Tag, payload: Payload) -> Result<()> {
        self.outboxes[dest]
            .send(Envelope {
                from: self.rank,
                tag,
                payload,
            })
            .map_err(|_| EngineError::Protocol {
                tag,
                expected: "a live peer to receive the message",
            })
    }

    fn probe_any(&self, tag: Tag) -> Option<usize> {
        self.drain_available();
        self.pending.borrow().iter().find(|e| e.tag == tag).map(|e| e.from)
    }

    fn recv(&self, tag: Tag, source: usize) -> Result<Payload> {
        loop {
            if let Some(envelope) = self.take_pending(tag, Some(source)) {
                return Ok(envelope.payload);
            }
            let envelope = self.inbox.recv().map_err(|_| EngineError::Protocol {
                tag,
                expected: "a message before the channel closed",
            })?;
            if envelope.tag == tag && envelope.from == source {
                return Ok(envelope.payload);
            }
            self.pending.borrow_mut().push_back(envelope);
        }
    }

    fn recv_any(&self, tag: Tag) -> Result<(usize, Payload)> {
        loop {
            if let Some(envelope) = self.take_pending(tag, None) {
                return Ok((envelope.from, envelope.payload));
            }
            let envelope = self.inbox.recv().map_err(|_| EngineError::Protocol {
                tag,
                expected: "a message before the channel closed",
            })?;
            if envelope.tag == tag {
                return Ok((envelope.from, envelope.payload));
            }
            self.pending.borrow_mut().push_back(envelope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_recv_round_trip() {
        let fleet = channel_fleet(2);
        fleet[0].send(1, Tag::HelpRequest, Payload::Scalar(7)).unwrap();
        let reply = fleet[1].recv(Tag::HelpRequest, 0).unwrap();
        assert_eq!(reply.as_scalar(), Some(7));
    }

    #[test]
    fn probe_does_not_consume() {
        let fleet = channel_fleet(2);
        fleet[0].send(1, Tag::SubtaskDone, Payload::Scalar(0)).unwrap();
        assert_eq!(fleet[1].probe_any(Tag::SubtaskDone), Some(0));
        assert_eq!(fleet[1].probe_any(Tag::SubtaskDone), Some(0));
        let (from, _) = fleet[1].recv_any(Tag::SubtaskDone).unwrap();
        assert_eq!(from, 0);
        assert_eq!(fleet[1].probe_any(Tag::SubtaskDone), None);
    }

    #[test]
    fn probe_is_tag_filtered_and_preserves_other_tags() {
        let fleet = channel_fleet(2);
        fleet[0].send(1, Tag::DonationDepth, Payload::Scalar(3)).unwrap();
        fleet[0].send(1, Tag::DonationStart, Payload::Scalar(0)).unwrap();
        assert_eq!(fleet[1].probe_any(Tag::DonationStart), Some(0));
        // pulling DonationStart first must not lose the DonationDepth message.
        let start = fleet[1].recv(Tag::DonationStart, 0).unwrap();
        assert_eq!(start.as_scalar(), Some(0));
        let depth = fleet[1].recv(Tag::DonationDepth, 0).unwrap();
        assert_eq!(depth.as_scalar(), Some(3));
    }
}
