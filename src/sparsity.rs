//! Two-pass sparsity analyzer.
//!
//! Builds the symbolic CSR structure of the free block K (lower
//! triangle, row ≥ col) and the boundary block K_b (free rows, Dirichlet
//! columns) before any numerical work. The first pass counts entries per
//! row, a prefix sum turns counts into offsets, and the second pass
//! writes column indices; both passes deduplicate candidates with a
//! per-row membership bitset that is reset between rows and run
//! row-parallel, each row independent of every other.

use crate::material::Theory;
use crate::neighborhood::NeighborTable;
use crate::proxy::MeshProxy;
use crate::sparse::CsrPattern;
use rayon::prelude::*;
use std::ops::Range;

/// The symbolic structure of one assembled system.
pub struct SystemPattern {
    /// Free block, lower triangle. Dirichlet rows hold only their
    /// diagonal (pinned to identity by the assembler).
    pub k: CsrPattern,
    /// Boundary block: free rows, Dirichlet columns (global DOF ids).
    pub kb: CsrPattern,
}

/// Candidate nodes coupled to `node` under the given theory, yielded in
/// deterministic (element-major) order with duplicates included; the
/// caller deduplicates.
fn coupled_nodes(
    proxy: &MeshProxy,
    neighbors: &NeighborTable,
    theories: &[Theory],
    node: usize,
    mut yield_node: impl FnMut(usize),
) {
    for &e in proxy.node_elements(node) {
        match theories[proxy.group_of(e)] {
            Theory::Local => {
                for &other in &proxy.mesh().element(e).nodes {
                    yield_node(other);
                }
            }
            Theory::Nonlocal => {
                for &e_nl in neighbors.neighbors(e) {
                    for &other in &proxy.mesh().element(e_nl).nodes {
                        yield_node(other);
                    }
                }
            }
        }
    }
}

/// Split a flat buffer into per-row mutable slices along CSR offsets.
fn split_rows<'a, T>(mut data: &'a mut [T], offsets: &[usize]) -> Vec<&'a mut [T]> {
    let mut rows = Vec::with_capacity(offsets.len() - 1);
    for w in offsets.windows(2) {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(w[1] - w[0]);
        rows.push(head);
        data = tail;
    }
    rows
}

/// Analyze the sparsity of a problem with `components` DOFs per node.
///
/// `dirichlet` flags constrained DOFs; `node_range` is the set of nodes
/// whose rows this rank owns (rows of other ranks come out empty).
pub fn analyze(
    proxy: &MeshProxy,
    neighbors: &NeighborTable,
    theories: &[Theory],
    dirichlet: &[bool],
    components: usize,
    node_range: &Range<usize>,
) -> SystemPattern {
    let n_dofs = proxy.nodes_count() * components;
    debug_assert_eq!(dirichlet.len(), n_dofs);

    // Count pass.
    let counts: Vec<(usize, usize)> = (0..n_dofs)
        .into_par_iter()
        .map_init(
            || (vec![false; proxy.nodes_count()], Vec::new()),
            |(included, touched), r| {
                let node = r / components;
                if !node_range.contains(&node) {
                    return (0, 0);
                }
                if dirichlet[r] {
                    return (1, 0);
                }
                let (mut k_count, mut kb_count) = (0, 0);
                coupled_nodes(proxy, neighbors, theories, node, |other| {
                    if !included[other] {
                        included[other] = true;
                        touched.push(other);
                        for comp in 0..components {
                            let col = other * components + comp;
                            if dirichlet[col] {
                                kb_count += 1;
                            } else if col <= r {
                                k_count += 1;
                            }
                        }
                    }
                });
                for &t in touched.iter() {
                    included[t] = false;
                }
                touched.clear();
                (k_count, kb_count)
            },
        )
        .collect();

    // Prefix sums.
    let mut k_offsets = vec![0usize; n_dofs + 1];
    let mut kb_offsets = vec![0usize; n_dofs + 1];
    for (r, &(k_count, kb_count)) in counts.iter().enumerate() {
        k_offsets[r + 1] = k_offsets[r] + k_count;
        kb_offsets[r + 1] = kb_offsets[r] + kb_count;
    }

    // Fill pass.
    let mut k_indices = vec![0usize; k_offsets[n_dofs]];
    let mut kb_indices = vec![0usize; kb_offsets[n_dofs]];
    let k_rows = split_rows(&mut k_indices, &k_offsets);
    let kb_rows = split_rows(&mut kb_indices, &kb_offsets);

    k_rows
        .into_par_iter()
        .zip(kb_rows.into_par_iter())
        .enumerate()
        .for_each_init(
            || (vec![false; proxy.nodes_count()], Vec::new()),
            |(included, touched), (r, (k_row, kb_row))| {
                let node = r / components;
                if !node_range.contains(&node) {
                    return;
                }
                if dirichlet[r] {
                    k_row[0] = r;
                    return;
                }
                let (mut k_at, mut kb_at) = (0, 0);
                coupled_nodes(proxy, neighbors, theories, node, |other| {
                    if !included[other] {
                        included[other] = true;
                        touched.push(other);
                        for comp in 0..components {
                            let col = other * components + comp;
                            if dirichlet[col] {
                                kb_row[kb_at] = col;
                                kb_at += 1;
                            } else if col <= r {
                                k_row[k_at] = col;
                                k_at += 1;
                            }
                        }
                    }
                });
                for &t in touched.iter() {
                    included[t] = false;
                }
                touched.clear();
                k_row.sort_unstable();
                kb_row.sort_unstable();
            },
        );

    SystemPattern {
        k: CsrPattern::new(n_dofs, n_dofs, k_offsets, k_indices),
        kb: CsrPattern::new(n_dofs, n_dofs, kb_offsets, kb_indices),
    }
}
