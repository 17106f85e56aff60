//! Cuthill-McKee bandwidth-reducing node permutation.
//!
//! The permutation is computed on the node adjacency graph induced by
//! the assembly pattern: under the local theory two nodes are adjacent
//! when they share an element, under the nonlocal theory when their
//! elements are within the neighbor table's search radius. Renumbering
//! the mesh with the permutation (see [`crate::mesh::Mesh::renumber`])
//! before assembly reduces the stiffness-matrix bandwidth.

use crate::neighborhood::NeighborTable;
use crate::proxy::MeshProxy;
use rayon::prelude::*;

/// CSR node adjacency graph (no self edges).
pub struct NodeGraph {
    shifts: Vec<usize>,
    indices: Vec<usize>,
}

impl NodeGraph {
    /// Build the adjacency graph of the assembly pattern.
    ///
    /// With `neighbors = None` the local pattern is used; otherwise two
    /// nodes are adjacent whenever the nonlocal pattern couples them.
    pub fn build(proxy: &MeshProxy, neighbors: Option<&NeighborTable>) -> Self {
        let n = proxy.nodes_count();
        let rows: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map_init(
                || vec![false; n],
                |included, node| {
                    let mut row = Vec::new();
                    let mut add = |other: usize, included: &mut Vec<bool>| {
                        if other != node && !included[other] {
                            included[other] = true;
                            row.push(other);
                        }
                    };
                    for &e in proxy.node_elements(node) {
                        match neighbors {
                            None => {
                                for &other in &proxy.mesh().element(e).nodes {
                                    add(other, included);
                                }
                            }
                            Some(table) => {
                                for &e_nl in table.neighbors(e) {
                                    for &other in &proxy.mesh().element(e_nl).nodes {
                                        add(other, included);
                                    }
                                }
                                // Local coupling still applies when the
                                // element's group runs the local theory.
                                if table.neighbors(e).is_empty() {
                                    for &other in &proxy.mesh().element(e).nodes {
                                        add(other, included);
                                    }
                                }
                            }
                        }
                    }
                    for &other in &row {
                        included[other] = false;
                    }
                    row
                },
            )
            .collect();

        let mut shifts = Vec::with_capacity(n + 1);
        shifts.push(0);
        for row in &rows {
            shifts.push(shifts.last().unwrap() + row.len());
        }
        let indices = rows.concat();
        Self { shifts, indices }
    }

    /// Number of nodes.
    pub fn nodes_count(&self) -> usize {
        self.shifts.len() - 1
    }

    /// Degree of a node.
    #[inline]
    pub fn degree(&self, node: usize) -> usize {
        self.shifts[node + 1] - self.shifts[node]
    }

    /// Adjacent nodes of `node`.
    #[inline]
    pub fn row(&self, node: usize) -> &[usize] {
        &self.indices[self.shifts[node]..self.shifts[node + 1]]
    }

    /// Matrix bandwidth under a node permutation (old index → new index).
    pub fn bandwidth(&self, perm: &[usize]) -> usize {
        let mut band = 0;
        for node in 0..self.nodes_count() {
            for &other in self.row(node) {
                band = band.max(perm[node].abs_diff(perm[other]));
            }
        }
        band
    }
}

fn min_degree_node(graph: &NodeGraph, taken: &[usize]) -> Option<usize> {
    (0..graph.nodes_count())
        .filter(|&v| taken[v] == usize::MAX)
        .min_by_key(|&v| (graph.degree(v), v))
}

/// Compute the Cuthill-McKee permutation (old node index → new index).
///
/// Starts from the minimum-degree node (ties broken by lowest index) and
/// runs a breadth-first traversal; within each layer newly discovered
/// nodes are assigned in ascending degree order (stable). Disconnected
/// components are seeded with their own minimum-degree node.
pub fn cuthill_mckee(proxy: &MeshProxy, neighbors: Option<&NeighborTable>) -> Vec<usize> {
    let graph = NodeGraph::build(proxy, neighbors);
    let n = graph.nodes_count();
    let mut permutation = vec![usize::MAX; n];
    if n == 0 {
        return permutation;
    }

    let mut index = 0;
    let seed = min_degree_node(&graph, &permutation).unwrap();
    permutation[seed] = index;
    index += 1;
    let mut layer = vec![seed];

    while index < n {
        let mut next = Vec::new();
        for &node in &layer {
            let mut discovered: Vec<usize> = graph
                .row(node)
                .iter()
                .copied()
                .filter(|&v| permutation[v] == usize::MAX)
                .collect();
            discovered.sort_by_key(|&v| graph.degree(v));
            for v in discovered {
                if permutation[v] == usize::MAX {
                    permutation[v] = index;
                    index += 1;
                    next.push(v);
                }
            }
        }
        if next.is_empty() {
            let seed = min_degree_node(&graph, &permutation)
                .expect("unvisited node must exist while index < n");
            permutation[seed] = index;
            index += 1;
            next.push(seed);
        }
        layer = next;
    }

    permutation
}

/// Reverse Cuthill-McKee: the CM order reversed, which usually gives a
/// slightly better profile for elimination-based solvers.
pub fn reverse_cuthill_mckee(proxy: &MeshProxy, neighbors: Option<&NeighborTable>) -> Vec<usize> {
    let mut perm = cuthill_mckee(proxy, neighbors);
    let n = perm.len();
    for p in &mut perm {
        *p = n - 1 - *p;
    }
    perm
}
