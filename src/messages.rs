//! The tagged-message vocabulary exchanged over the transport. The
//! transport is generic over these two types; nothing downstream of
//! `transport` needs to know how a `Payload` is encoded on the wire.

use crate::graph::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    FilePath,
    HelpRequest,
    HelpResponse,
    DonationDepth,
    DonationStart,
    DonationEnd,
    DonationBase,
    DonationCandidates,
    SubtaskDone,
    AllDone,
    ResultCounts,
    StatSent,
    StatAccepted,
    StatRejected,
}

/// The rank of the coordinator. Fixed: rank 0 never enumerates.
pub const COORDINATOR_RANK: usize = 0;

#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    Scalar(i64),
    Nodes(Vec<Node>),
    /// `(size, count)` pairs; a sparse encoding of a `CountTable` since
    /// most sizes are unobserved in any one worker's share of the graph.
    Counts(Vec<(usize, i64)>),
}

impl Payload {
    pub fn as_scalar(&self) -> Option<i64> {
        match self {
            Payload::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[Node]> {
        match self {
            Payload::Nodes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_counts(&self) -> Option<&[(usize, i64)]> {
        match self {
            Payload::Counts(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}
