//! The Topology Generator - random and regular graph families.
//!
//! Four construction algorithms, selected by [`Topology`]:
//! - **Erdos-Renyi**: independent edges with `p = min(1, 6 / n)`
//! - **Small-world**: ring lattice (2 clockwise links per node) + 10% rewiring
//! - **Scale-free**: preferential attachment from a 3-clique, 2 links per node
//! - **Grid**: `floor(sqrt(n))` square lattice; leftover nodes stay isolated
//!
//! All randomness comes from the caller's `Rng`, so a seeded stream always
//! yields the same graph.

use crate::graph::{normalize, Edge, Graph};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Target mean degree for Erdos-Renyi graphs.
pub const ER_TARGET_DEGREE: f64 = 6.0;

/// Clockwise lattice links per node in the small-world ring (k / 2).
pub const RING_HALF_DEGREE: usize = 2;

/// Per-endpoint rewiring probability in the small-world graph.
pub const REWIRE_PROBABILITY: f64 = 0.1;

/// Size of the fully connected seed core for preferential attachment.
pub const SCALE_FREE_CORE: usize = 3;

/// Edges each newcomer attaches with during preferential attachment.
pub const ATTACHMENTS_PER_NODE: usize = 2;

/// Graph family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Topology {
    #[serde(rename = "random_erdos_renyi")]
    ErdosRenyi,

    #[serde(rename = "small_world")]
    SmallWorld,

    #[serde(rename = "scale_free")]
    ScaleFree,

    #[default]
    #[serde(rename = "grid")]
    Grid,
}

impl Topology {
    /// Returns every topology.
    pub fn all() -> Vec<Topology> {
        vec![
            Topology::ErdosRenyi,
            Topology::SmallWorld,
            Topology::ScaleFree,
            Topology::Grid,
        ]
    }

    /// Returns the wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Topology::ErdosRenyi => "random_erdos_renyi",
            Topology::SmallWorld => "small_world",
            Topology::ScaleFree => "scale_free",
            Topology::Grid => "grid",
        }
    }

    /// Resolves a name, degrading unknown values to `Grid`.
    pub fn from_name(name: &str) -> Topology {
        name.parse().unwrap_or_else(|_| {
            debug!("Unknown topology '{}', falling back to grid", name);
            Topology::Grid
        })
    }

    /// Builds a graph of this family over `n` nodes.
    pub fn generate<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Graph {
        let graph = match self {
            Topology::ErdosRenyi => erdos_renyi(n, rng),
            Topology::SmallWorld => small_world(n, rng),
            Topology::ScaleFree => scale_free(n, rng),
            Topology::Grid => grid(n),
        };

        debug!(
            "Generated {} graph: {} nodes, {} edges, avg degree {:.2}",
            self.name(),
            graph.node_count(),
            graph.edge_count(),
            graph.average_degree()
        );

        graph
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random_erdos_renyi" | "erdos_renyi" | "random" => Ok(Topology::ErdosRenyi),
            "small_world" | "smallworld" | "watts_strogatz" => Ok(Topology::SmallWorld),
            "scale_free" | "scalefree" | "barabasi_albert" => Ok(Topology::ScaleFree),
            "grid" | "lattice" => Ok(Topology::Grid),
            _ => Err(format!("Unknown topology: {}", s)),
        }
    }
}

/// Generates a graph for a topology name; unknown names produce a grid.
pub fn generate<R: Rng + ?Sized>(n: usize, topology: &str, rng: &mut R) -> Graph {
    Topology::from_name(topology).generate(n, rng)
}

/// Includes every unordered pair independently with `p = min(1, 6 / n)`.
fn erdos_renyi<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Graph {
    let p = if n == 0 {
        1.0
    } else {
        (ER_TARGET_DEGREE / n as f64).min(1.0)
    };

    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen_bool(p) {
                edges.push((i, j));
            }
        }
    }

    Graph::from_edges(n, edges)
}

/// Ring lattice plus skip-on-collision rewiring.
///
/// Each node `i`, in order, visits the edges incident to it; with
/// probability `REWIRE_PROBABILITY` the far endpoint is replaced by a
/// uniform target unless that would create a self-loop or an existing edge.
fn small_world<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Graph {
    let mut edges: BTreeSet<Edge> = BTreeSet::new();
    for i in 0..n {
        for step in 1..=RING_HALF_DEGREE {
            let neighbor = (i + step) % n;
            if neighbor != i {
                edges.insert(normalize(i, neighbor));
            }
        }
    }

    let mut rewired = 0usize;
    for i in 0..n {
        let incident: Vec<usize> = edges
            .iter()
            .filter_map(|&(a, b)| match (a == i, b == i) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .collect();

        for old in incident {
            if !rng.gen_bool(REWIRE_PROBABILITY) {
                continue;
            }
            let target = rng.gen_range(0..n);
            if target == i || edges.contains(&normalize(i, target)) {
                continue;
            }
            edges.remove(&normalize(i, old));
            edges.insert(normalize(i, target));
            rewired += 1;
        }
    }

    debug!("Small-world rewiring replaced {} of {} edges", rewired, edges.len());
    Graph::from_edges(n, edges)
}

/// Preferential attachment (Barabasi-Albert) from a `min(3, n)` clique.
fn scale_free<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Graph {
    let core = n.min(SCALE_FREE_CORE);
    let mut edges = Vec::new();
    let mut degree = vec![0usize; n];

    for i in 0..core {
        for j in (i + 1)..core {
            edges.push((i, j));
            degree[i] += 1;
            degree[j] += 1;
        }
    }

    for i in core..n {
        let m = ATTACHMENTS_PER_NODE.min(i);
        let mut targets = BTreeSet::new();

        let reachable = degree[..i].iter().filter(|&&d| d > 0).count();
        match WeightedIndex::new(&degree[..i]) {
            Ok(by_degree) if reachable >= m => {
                while targets.len() < m {
                    targets.insert(by_degree.sample(rng));
                }
            }
            // No degree mass to draw from; attach uniformly instead
            _ => {
                while targets.len() < m {
                    targets.insert(rng.gen_range(0..i));
                }
            }
        }

        for target in targets {
            edges.push((i, target));
            degree[i] += 1;
            degree[target] += 1;
        }
    }

    Graph::from_edges(n, edges)
}

/// Square lattice over the first `side * side` nodes, row-major.
fn grid(n: usize) -> Graph {
    let side = integer_sqrt(n);
    let cells = side * side;

    let mut edges = Vec::with_capacity(2 * cells);
    for i in 0..cells {
        let (row, col) = (i / side, i % side);
        if col + 1 < side {
            edges.push((i, i + 1));
        }
        if row + 1 < side {
            edges.push((i, i + side));
        }
    }

    Graph::from_edges(n, edges)
}

/// `floor(sqrt(n))` without float rounding surprises near perfect squares.
fn integer_sqrt(n: usize) -> usize {
    let mut side = (n as f64).sqrt() as usize;
    while side * side > n {
        side -= 1;
    }
    while (side + 1) * (side + 1) <= n {
        side += 1;
    }
    side
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_integer_sqrt() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(8), 2);
        assert_eq!(integer_sqrt(9), 3);
        assert_eq!(integer_sqrt(20), 4);
        assert_eq!(integer_sqrt(500), 22);
    }

    #[test]
    fn test_grid_exact_neighbors() {
        let graph = grid(9);

        assert_eq!(graph.neighbors(4), &[1, 3, 5, 7]);
        assert!(!graph.has_edge(0, 2));
        assert_eq!(graph.neighbors(0), &[1, 3]);
        assert_eq!(graph.edge_count(), 12);
    }

    #[test]
    fn test_grid_leftover_nodes_isolated() {
        let graph = grid(20);

        assert_eq!(graph.isolated_nodes(), vec![16, 17, 18, 19]);
        // Row ends do not wrap
        assert!(!graph.has_edge(3, 4));
        assert!(graph.has_edge(12, 13));
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_unknown_name_falls_back_to_grid() {
        assert_eq!(Topology::from_name("hypercube"), Topology::Grid);
        assert_eq!(Topology::from_name("SMALL_WORLD"), Topology::SmallWorld);

        let graph = generate(9, "hypercube", &mut rng(1));
        assert_eq!(graph, grid(9));
    }

    #[test]
    fn test_name_roundtrip() {
        for topology in Topology::all() {
            assert_eq!(topology.name().parse::<Topology>(), Ok(topology));
            assert_eq!(topology.to_string(), topology.name());
        }
        assert!("torus".parse::<Topology>().is_err());
    }

    #[test]
    fn test_erdos_renyi_saturates_for_small_n() {
        // p = min(1, 6/5) = 1 -> complete graph
        let graph = erdos_renyi(5, &mut rng(7));
        assert_eq!(graph.edge_count(), 10);
    }

    #[test]
    fn test_small_world_preserves_edge_count() {
        let graph = small_world(100, &mut rng(42));

        // Rewiring moves endpoints but never adds or removes edges
        assert_eq!(graph.edge_count(), 200);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_small_world_rewires_some_lattice_edges() {
        let n = 100;
        // Ring links join nodes at most RING_HALF_DEGREE apart around the cycle
        let is_lattice = |(a, b): Edge| {
            let gap = b - a;
            gap <= RING_HALF_DEGREE || n - gap <= RING_HALF_DEGREE
        };

        for seed in 0..5 {
            let graph = small_world(n, &mut rng(seed));
            let edges = graph.edges();
            let shortcuts = edges.iter().filter(|&&e| !is_lattice(e)).count();

            // ~19% of the 200 lattice edges move; a pure ring would have none
            assert!(shortcuts >= 10 && shortcuts <= 80, "seed {}: {} shortcuts", seed, shortcuts);

            // Rewiring moves one endpoint at a time, so the ring stays mostly intact
            let detached = (0..n)
                .filter(|&i| !graph.neighbors(i).iter().any(|&j| is_lattice(normalize(i, j))))
                .count();
            assert!(detached <= 5, "seed {}: {} nodes lost every ring link", seed, detached);
        }
    }

    #[test]
    fn test_small_world_tiny_rings() {
        assert_eq!(small_world(1, &mut rng(3)).edge_count(), 0);
        assert_eq!(small_world(2, &mut rng(3)).edge_count(), 1);
        assert_eq!(small_world(3, &mut rng(3)).edge_count(), 3);
    }

    #[test]
    fn test_scale_free_edge_count() {
        for n in [1usize, 2, 3, 4, 10, 250] {
            let graph = scale_free(n, &mut rng(n as u64));
            let core = n.min(SCALE_FREE_CORE);
            let expected = core * core.saturating_sub(1) / 2 + 2 * n.saturating_sub(core);
            assert_eq!(graph.edge_count(), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_scale_free_grows_hubs() {
        let graph = scale_free(500, &mut rng(11));
        let max_degree = (0..500).map(|i| graph.degree(i)).max().unwrap_or(0);

        // Every newcomer has degree >= 2; rich-get-richer creates hubs far above the mean (~4)
        assert!((0..500).all(|i| graph.degree(i) >= 2));
        assert!(max_degree >= 15, "max degree {}", max_degree);
    }

    #[test]
    fn test_generation_is_deterministic() {
        for topology in Topology::all() {
            let a = topology.generate(120, &mut rng(99));
            let b = topology.generate(120, &mut rng(99));
            assert_eq!(a, b, "{} not reproducible", topology);
        }
    }
}
