//! An immutable, in-memory undirected graph with O(1) expected edge lookup.
//!
//! The graph is populated once by ingestion and is read-only for the rest
//! of the worker's lifetime: the enumerator only ever calls `is_edge` and
//! `neighbors`, never mutates the structure it was handed.

use std::cell::OnceCell;

use fnv::{FnvHashMap, FnvHashSet};

pub type Node = u32;

/// Normalizes an unordered pair so set membership is symmetric by
/// construction; this is the chosen resolution of the source's
/// double-insertion ambiguity (see DESIGN.md).
#[inline]
fn canonical(u: Node, v: Node) -> (Node, Node) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

#[derive(Default)]
pub struct Graph {
    edges: FnvHashSet<(Node, Node)>,
    adjacency: FnvHashMap<Node, Vec<Node>>,
    threshold: OnceCell<u64>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Inserts the edge if absent, creating either endpoint as a node if
    /// needed. Self-loops are rejected outright: the graph never records
    /// them, so the enumerator never has to special-case one.
    ///
    /// Returns whether the edge was newly added.
    pub fn add_edge(&mut self, u: Node, v: Node) -> bool {
        if u == v {
            return false;
        }
        let key = canonical(u, v);
        if self.edges.insert(key) {
            self.adjacency.entry(u).or_default().push(v);
            self.adjacency.entry(v).or_default().push(u);
            true
        } else {
            self.adjacency.entry(u).or_default();
            self.adjacency.entry(v).or_default();
            false
        }
    }

    #[inline]
    pub fn is_edge(&self, u: Node, v: Node) -> bool {
        self.edges.contains(&canonical(u, v))
    }

    /// Neighbor order is ingestion order; the enumerator never relies on
    /// it being sorted (it sorts its own candidate slices explicitly).
    pub fn neighbors(&self, u: Node) -> &[Node] {
        self.adjacency.get(&u).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.adjacency.keys().copied()
    }

    /// `max(2, (num_edges / num_nodes) * 5)`, integer division preserved
    /// exactly so the result is reproducible across runs regardless of
    /// platform. Memoized on first call.
    pub fn donation_threshold(&self) -> u64 {
        *self.threshold.get_or_init(|| {
            let nodes = self.num_nodes() as u64;
            if nodes == 0 {
                return 2;
            }
            let avg_degree = (self.num_edges() as u64) / nodes;
            std::cmp::max(2, avg_degree * 5)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_idempotent() {
        let mut g = Graph::new();
        assert!(g.add_edge(1, 2));
        assert!(!g.add_edge(1, 2));
        assert!(!g.add_edge(2, 1));
        assert_eq!(g.num_edges(), 1);
    }

    #[test]
    fn self_loops_are_never_recorded() {
        let mut g = Graph::new();
        assert!(!g.add_edge(4, 4));
        assert_eq!(g.num_edges(), 0);
        assert!(!g.is_edge(4, 4));
    }

    #[test]
    fn edge_symmetry() {
        let mut g = Graph::new();
        g.add_edge(1, 2);
        assert!(g.is_edge(1, 2));
        assert!(g.is_edge(2, 1));
        assert!(g.neighbors(1).contains(&2));
        assert!(g.neighbors(2).contains(&1));
    }

    #[test]
    fn donation_threshold_floor_is_two() {
        let mut g = Graph::new();
        g.add_edge(1, 2);
        assert_eq!(g.donation_threshold(), 2);
    }

    #[test]
    fn donation_threshold_uses_integer_division() {
        let mut g = Graph::new();
        // 5 nodes, 7 edges -> 7/5 = 1 (integer division) -> 1*5 = 5
        for (u, v) in [(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4), (4, 5)] {
            g.add_edge(u, v);
        }
        assert_eq!(g.num_nodes(), 5);
        assert_eq!(g.num_edges(), 7);
        assert_eq!(g.donation_threshold(), 5);
    }
}
