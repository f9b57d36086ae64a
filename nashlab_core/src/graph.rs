//! Immutable simple undirected graph.
//!
//! Generators never edit adjacency in place. They collect candidate edges
//! and materialize the symmetric adjacency exactly once through
//! [`Graph::from_edges`], which drops self-loops and duplicates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Undirected edge stored with `0 <= a < b`.
pub type Edge = (usize, usize);

/// Normalizes an endpoint pair so the smaller id comes first.
pub fn normalize(a: usize, b: usize) -> Edge {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Invariant violations reported by [`Graph::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} is its own neighbor")]
    SelfLoop(usize),

    #[error("link {from} -> {to} has no reverse link")]
    Asymmetric { from: usize, to: usize },

    #[error("node {node} lists neighbor {neighbor} more than once")]
    DuplicateNeighbor { node: usize, neighbor: usize },

    #[error("node {node} references missing node {neighbor}")]
    OutOfRange { node: usize, neighbor: usize },
}

/// A simple (no self-loop, no parallel edge) undirected graph over `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// Sorted neighbor list per node
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Creates a graph with `n` isolated nodes.
    pub fn empty(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
        }
    }

    /// Materializes a graph from candidate edges.
    ///
    /// Self-loops, repeated pairs (in either orientation) and endpoints
    /// outside `0..n` are discarded.
    pub fn from_edges<I>(n: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = Edge>,
    {
        let unique: BTreeSet<Edge> = edges
            .into_iter()
            .filter(|&(a, b)| a != b && a < n && b < n)
            .map(|(a, b)| normalize(a, b))
            .collect();

        let mut adjacency = vec![Vec::new(); n];
        for (a, b) in unique {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        Self { adjacency }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Sorted neighbors of `node`.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    /// Degree of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Whether `a` and `b` share an edge.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency
            .get(a)
            .map_or(false, |n| n.binary_search(&b).is_ok())
    }

    /// Mean degree, 0.0 for the empty graph.
    pub fn average_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        2.0 * self.edge_count() as f64 / self.node_count() as f64
    }

    /// Nodes with no neighbors.
    pub fn isolated_nodes(&self) -> Vec<usize> {
        (0..self.node_count())
            .filter(|&i| self.adjacency[i].is_empty())
            .collect()
    }

    /// Edge list with `a < b`, ordered by `a` then `b`.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (a, neighbors) in self.adjacency.iter().enumerate() {
            for &b in neighbors {
                if a < b {
                    edges.push((a, b));
                }
            }
        }
        edges
    }

    /// Checks the simple-graph invariants.
    ///
    /// Graphs built through `from_edges` always pass; deserialized graphs
    /// may not.
    pub fn validate(&self) -> Result<(), GraphError> {
        let n = self.node_count();
        for (node, neighbors) in self.adjacency.iter().enumerate() {
            let mut seen = BTreeSet::new();
            for &neighbor in neighbors {
                if neighbor >= n {
                    return Err(GraphError::OutOfRange { node, neighbor });
                }
                if neighbor == node {
                    return Err(GraphError::SelfLoop(node));
                }
                if !seen.insert(neighbor) {
                    return Err(GraphError::DuplicateNeighbor { node, neighbor });
                }
                if !self.adjacency[neighbor].contains(&node) {
                    return Err(GraphError::Asymmetric {
                        from: node,
                        to: neighbor,
                    });
                }
            }
        }
        Ok(())
    }
}
