//! Distributed clique census: enumerate every clique in an undirected
//! graph exactly once, counted by size, across a fleet of ranked
//! workers that cooperate through message passing and dynamic work
//! donation.

pub mod cli;
pub mod coordinator;
pub mod count_table;
pub mod donation;
pub mod enumerator;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod messages;
pub mod report;
pub mod transport;
pub mod worker;
