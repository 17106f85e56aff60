//! Row-parallel stiffness assembly.
//!
//! The driver walks the rows this rank owns; for each free row it
//! accumulates local and nonlocal contributions from the elements
//! incident to the row's node, routing entries with a Dirichlet column
//! into the boundary block K_b and writing Dirichlet rows as identity.
//! Only the lower triangle of K is stored (row ≥ col). Each row is
//! written by exactly one worker and elements are visited in ascending
//! index order, so results are reproducible for a fixed mesh.
//!
//! The physics enters through [`BilinearForm`]: the thermal and
//! mechanical modules supply the actual integrands.

use crate::influence::Influence;
use crate::material::{Model, Theory};
use crate::neighborhood::NeighborTable;
use crate::proxy::MeshProxy;
use crate::sparse::CsrBlock;
use crate::sparsity::SystemPattern;
use log::debug;
use rayon::prelude::*;
use std::ops::Range;

/// A bilinear form integrated per basis pair.
///
/// `ci`/`cj` are DOF components of the test and trial side; scalar
/// problems always see `(0, 0)`.
pub(crate) trait BilinearForm: Sync {
    /// DOF components per node (1 scalar, 2 vector).
    fn components(&self) -> usize;

    /// Local single-element integral for basis pair `(i, j)` on `e`.
    fn local(&self, proxy: &MeshProxy, e: usize, i: usize, j: usize, ci: usize, cj: usize) -> f64;

    /// Nonlocal element-pair integral for bases `i_l` on `e_l` and
    /// `j_nl` on `e_nl`, weighted by the influence kernel.
    #[allow(clippy::too_many_arguments)]
    fn nonlocal(
        &self,
        proxy: &MeshProxy,
        e_l: usize,
        e_nl: usize,
        i_l: usize,
        j_nl: usize,
        ci: usize,
        cj: usize,
        kernel: &Influence,
    ) -> f64;
}

/// Assembled stiffness blocks.
pub(crate) struct AssembledSystem {
    /// Free block, lower triangle; Dirichlet rows are identity.
    pub k: CsrBlock,
    /// Boundary block: free rows, Dirichlet columns.
    pub kb: CsrBlock,
}

/// Fill the stiffness values over a previously analyzed pattern.
pub(crate) fn assemble<F: BilinearForm>(
    proxy: &MeshProxy,
    neighbors: &NeighborTable,
    models: &[&Model],
    dirichlet: &[bool],
    pattern: SystemPattern,
    form: &F,
    node_range: &Range<usize>,
) -> AssembledSystem {
    let components = form.components();
    let n_dofs = proxy.nodes_count() * components;

    let rows: Vec<(Vec<f64>, Vec<f64>)> = (0..n_dofs)
        .into_par_iter()
        .map(|r| {
            let node = r / components;
            let ci = r % components;
            let mut k_row = vec![0.0; pattern.k.row_cols(r).len()];
            let mut kb_row = vec![0.0; pattern.kb.row_cols(r).len()];

            if !node_range.contains(&node) {
                return (k_row, kb_row);
            }
            if dirichlet[r] {
                // Identity row pins the DOF to the value the boundary
                // applier writes into the right-hand side.
                k_row[0] = 1.0;
                return (k_row, kb_row);
            }

            for &e_l in proxy.node_elements(node) {
                let i_l = proxy
                    .global_to_local(e_l, node)
                    .expect("node incidence matches element connectivity");
                let model = models[proxy.group_of(e_l)];
                let p1 = model.local_weight();

                for (j, &node_j) in proxy.mesh().element(e_l).nodes.iter().enumerate() {
                    for cj in 0..components {
                        let col = node_j * components + cj;
                        if dirichlet[col] {
                            if let Some(at) = pattern.kb.position_in_row(r, col) {
                                kb_row[at] += p1 * form.local(proxy, e_l, i_l, j, ci, cj);
                            }
                        } else if col <= r {
                            if let Some(at) = pattern.k.position_in_row(r, col) {
                                k_row[at] += p1 * form.local(proxy, e_l, i_l, j, ci, cj);
                            }
                        }
                    }
                }

                if model.theory() == Theory::Nonlocal {
                    let p2 = model.nonlocal_weight();
                    let kernel = model
                        .influence()
                        .expect("nonlocal theory always carries a kernel");
                    for &e_nl in neighbors.neighbors(e_l) {
                        for (j_nl, &node_j) in
                            proxy.mesh().element(e_nl).nodes.iter().enumerate()
                        {
                            for cj in 0..components {
                                let col = node_j * components + cj;
                                if dirichlet[col] {
                                    if let Some(at) = pattern.kb.position_in_row(r, col) {
                                        kb_row[at] += p2
                                            * form
                                                .nonlocal(proxy, e_l, e_nl, i_l, j_nl, ci, cj, kernel);
                                    }
                                } else if col <= r {
                                    if let Some(at) = pattern.k.position_in_row(r, col) {
                                        k_row[at] += p2
                                            * form
                                                .nonlocal(proxy, e_l, e_nl, i_l, j_nl, ci, cj, kernel);
                                    }
                                }
                            }
                        }
                    }
                }
            }

            (k_row, kb_row)
        })
        .collect();

    let (k_rows, kb_rows): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let k = CsrBlock::from_rows(pattern.k, k_rows);
    let kb = CsrBlock::from_rows(pattern.kb, kb_rows);
    debug!(
        "assembled {} DOFs: {} nonzeros in K, {} in K_b",
        n_dofs,
        k.pattern().nnz(),
        kb.pattern().nnz()
    );
    AssembledSystem { k, kb }
}
