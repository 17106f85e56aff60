//! Stationary plane-stress elasticity with the local/nonlocal mixed
//! theory.
//!
//! Displacements carry two DOFs per node (`2*node + comp`); every basis
//! pair expands into the four component pairs {XX, XY, YX, YY} with the
//! plane-stress coefficients `[E/(1-ν²), νE/(1-ν²), E/(2(1+ν))]`. The
//! nonlocal component terms are derived from the symmetric bilinear form
//! `∫∫ ε(v)(x)·C·κ(x,y)·ε(u)(y)`, so the same strain-displacement
//! structure appears on both sides and the assembled matrix is symmetric
//! by construction.
//!
//! An optional nodal temperature-change field adds the thermoelastic
//! load `α E/(1-ν) ΔT` integrated against the basis gradients.

use crate::assembly::{self, BilinearForm};
use crate::boundary::{self, BoundaryConditions, MechanicalBc};
use crate::error::{Error, Result};
use crate::influence::Influence;
use crate::material::{self, ElasticProperties, MaterialGroup, Materials, Model, Theory};
use crate::neighborhood::NeighborTable;
use crate::parallel::{node_range, Communicator};
use crate::postprocess;
use crate::proxy::MeshProxy;
use crate::solver::Solver;
use crate::sparsity;
use crate::types::{vector_dof, Comp, Vec2};
use log::debug;
use rayon::prelude::*;

/// Voigt component pair value for gradients `gi` (test) and `gj` (trial).
#[inline]
fn component_term(coeffs: &[f64; 3], ci: usize, cj: usize, gi: &Vec2, gj: &Vec2) -> f64 {
    let [c0, c1, c2] = *coeffs;
    match (ci, cj) {
        (0, 0) => c0 * gi.x * gj.x + c2 * gi.y * gj.y,
        (0, 1) => c1 * gi.x * gj.y + c2 * gi.y * gj.x,
        (1, 0) => c1 * gi.y * gj.x + c2 * gi.x * gj.y,
        _ => c0 * gi.y * gj.y + c2 * gi.x * gj.x,
    }
}

/// Plane-stress bilinear form.
struct MechanicalForm {
    coeffs: Vec<[f64; 3]>,
}

impl BilinearForm for MechanicalForm {
    fn components(&self) -> usize {
        2
    }

    fn local(&self, proxy: &MeshProxy, e: usize, i: usize, j: usize, ci: usize, cj: usize) -> f64 {
        let coeffs = &self.coeffs[proxy.group_of(e)];
        let tables = proxy.tables(e);
        (0..tables.qnodes_count())
            .map(|q| {
                let gi = proxy.derivatives(e, i, q);
                let gj = proxy.derivatives(e, j, q);
                tables.weight(q) * proxy.jacobian(e, q) * component_term(coeffs, ci, cj, &gi, &gj)
            })
            .sum()
    }

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
    ) -> f64 {
        let coeffs = &self.coeffs[proxy.group_of(e_l)];
        let tables_l = proxy.tables(e_l);
        let tables_nl = proxy.tables(e_nl);
        let mut integral = 0.0;
        for q_l in 0..tables_l.qnodes_count() {
            let x_l = proxy.quad_coord(e_l, q_l);
            let mut inner = Vec2::zeros();
            for q_nl in 0..tables_nl.qnodes_count() {
                let weight = tables_nl.weight(q_nl)
                    * proxy.jacobian(e_nl, q_nl)
                    * kernel.value(&x_l, &proxy.quad_coord(e_nl, q_nl));
                inner += proxy.derivatives(e_nl, j_nl, q_nl) * weight;
            }
            let gi = proxy.derivatives(e_l, i_l, q_l);
            integral += tables_l.weight(q_l)
                * proxy.jacobian(e_l, q_l)
                * component_term(coeffs, ci, cj, &gi, &inner);
        }
        integral
    }
}

/// Thermoelastic stress factor `α E/(1-ν)` per group.
fn thermal_factors(resolved: &[&MaterialGroup<ElasticProperties>]) -> Vec<f64> {
    resolved
        .iter()
        .map(|m| {
            m.physical.thermal_expansion * m.physical.youngs_modulus
                / (1.0 - m.physical.poissons_ratio)
        })
        .collect()
}

/// Thermoelastic load for the rows this rank owns:
/// `f[dof(v,c)] += ∫ factor·ΔT · ∂N_v/∂x_c`, mixed local/nonlocal.
fn assemble_thermal_load(
    proxy: &MeshProxy,
    neighbors: &NeighborTable,
    models: &[&Model],
    factors: &[f64],
    delta_qnodes: &[f64],
    range: &std::ops::Range<usize>,
    f: &mut [f64],
) {
    let contributions: Vec<Vec2> = (0..proxy.nodes_count())
        .into_par_iter()
        .map(|node| {
            if !range.contains(&node) {
                return Vec2::zeros();
            }
            let mut integral = Vec2::zeros();
            for &e_l in proxy.node_elements(node) {
                let i_l = proxy
                    .global_to_local(e_l, node)
                    .expect("node incidence matches element connectivity");
                let group = proxy.group_of(e_l);
                let model = models[group];
                let factor = factors[group];
                let tables_l = proxy.tables(e_l);
                let shift_l = proxy.quad_shift(e_l);

                let mut local = Vec2::zeros();
                for q in 0..tables_l.qnodes_count() {
                    local += proxy.derivatives(e_l, i_l, q)
                        * (tables_l.weight(q) * proxy.jacobian(e_l, q) * delta_qnodes[shift_l + q]);
                }
                integral += local * (factor * model.local_weight());

                if model.theory() == Theory::Nonlocal {
                    let kernel = model
                        .influence()
                        .expect("nonlocal theory always carries a kernel");
                    let mut nonlocal = Vec2::zeros();
                    for q_l in 0..tables_l.qnodes_count() {
                        let x_l = proxy.quad_coord(e_l, q_l);
                        let mut inner = 0.0;
                        for &e_nl in neighbors.neighbors(e_l) {
                            let tables_nl = proxy.tables(e_nl);
                            let shift_nl = proxy.quad_shift(e_nl);
                            for q_nl in 0..tables_nl.qnodes_count() {
                                inner += tables_nl.weight(q_nl)
                                    * proxy.jacobian(e_nl, q_nl)
                                    * kernel.value(&x_l, &proxy.quad_coord(e_nl, q_nl))
                                    * delta_qnodes[shift_nl + q_nl];
                            }
                        }
                        nonlocal += proxy.derivatives(e_l, i_l, q_l)
                            * (tables_l.weight(q_l) * proxy.jacobian(e_l, q_l) * inner);
                    }
                    integral += nonlocal * (factor * model.nonlocal_weight());
                }
            }
            integral
        })
        .collect();

    for (node, value) in contributions.into_iter().enumerate() {
        f[vector_dof(node, Comp::X)] += value.x;
        f[vector_dof(node, Comp::Y)] += value.y;
    }
}

/// Solve the stationary plane-stress problem.
///
/// `delta_temperature` is an optional nodal temperature-change field
/// adding a thermoelastic load.
pub fn stationary_elasticity<'a>(
    proxy: &'a MeshProxy,
    neighbors: &'a NeighborTable,
    materials: &Materials<ElasticProperties>,
    conditions: &BoundaryConditions<MechanicalBc>,
    delta_temperature: Option<&[f64]>,
    solver: &dyn Solver,
    comm: &dyn Communicator,
) -> Result<MechanicalSolution<'a>> {
    let resolved = material::resolve(proxy, materials)?;
    let models: Vec<&Model> = resolved.iter().map(|m| &m.model).collect();
    let theories: Vec<Theory> = models.iter().map(|m| m.theory()).collect();
    let form = MechanicalForm {
        coeffs: resolved.iter().map(|m| m.physical.coeffs()).collect(),
    };

    if let Some(delta) = delta_temperature {
        if delta.len() != proxy.nodes_count() {
            return Err(Error::Parameter(format!(
                "delta_temperature has {} entries for {} nodes",
                delta.len(),
                proxy.nodes_count()
            )));
        }
    }

    let dirichlet = boundary::mechanical_dirichlet_flags(proxy, conditions)?;
    let range = node_range(proxy.nodes_count(), comm.rank(), comm.size());
    let pattern = sparsity::analyze(proxy, neighbors, &theories, &dirichlet, 2, &range);
    let system = assembly::assemble(proxy, neighbors, &models, &dirichlet, pattern, &form, &range);

    let mut f = vec![0.0; 2 * proxy.nodes_count()];
    if let Some(delta) = delta_temperature {
        let delta_qnodes = postprocess::nodes_to_qnodes(proxy, delta);
        assemble_thermal_load(
            proxy,
            neighbors,
            &models,
            &thermal_factors(&resolved),
            &delta_qnodes,
            &range,
            &mut f,
        );
    }
    boundary::apply_mechanical(proxy, conditions, &system.kb, &mut f)?;

    debug!("solving mechanical system with {}", solver.name());
    let displacement = solver.solve(&system.k.to_symmetric_csr(), &f)?;

    Ok(MechanicalSolution {
        proxy,
        neighbors,
        materials: resolved.into_iter().cloned().collect(),
        delta_temperature: delta_temperature.map(|d| d.to_vec()),
        displacement,
        fields: None,
    })
}

/// Nodal strain and stress fields in Voigt order
/// `[xx, yy, xy]` (engineering shear).
#[derive(Debug, Clone, PartialEq)]
pub struct StrainStress {
    pub strain: [Vec<f64>; 3],
    pub stress: [Vec<f64>; 3],
}

/// A solved displacement field with post-processing.
pub struct MechanicalSolution<'a> {
    proxy: &'a MeshProxy,
    neighbors: &'a NeighborTable,
    materials: Vec<MaterialGroup<ElasticProperties>>,
    delta_temperature: Option<Vec<f64>>,
    displacement: Vec<f64>,
    fields: Option<StrainStress>,
}

impl<'a> MechanicalSolution<'a> {
    /// Nodal displacements, interleaved `[u_x, u_y]` per node.
    pub fn displacement(&self) -> &[f64] {
        &self.displacement
    }

    /// The mesh proxy the solution lives on.
    pub fn proxy(&self) -> &MeshProxy {
        self.proxy
    }

    /// Displacement components of one node.
    pub fn displacement_at(&self, node: usize) -> Vec2 {
        Vec2::new(
            self.displacement[vector_dof(node, Comp::X)],
            self.displacement[vector_dof(node, Comp::Y)],
        )
    }

    /// Raw strain at every quadrature node, Voigt `[xx, yy, xy]`.
    fn strain_in_qnodes(&self) -> Vec<[f64; 3]> {
        let proxy = self.proxy;
        let mut strain = vec![[0.0; 3]; proxy.total_qnodes()];
        for e in 0..proxy.elements_count() {
            let shift = proxy.quad_shift(e);
            let nodes = &proxy.mesh().element(e).nodes;
            for q in 0..proxy.qnodes_count(e) {
                let entry = &mut strain[shift + q];
                for (i, &node) in nodes.iter().enumerate() {
                    let grad = proxy.derivatives(e, i, q);
                    let ux = self.displacement[vector_dof(node, Comp::X)];
                    let uy = self.displacement[vector_dof(node, Comp::Y)];
                    entry[0] += grad.x * ux;
                    entry[1] += grad.y * uy;
                    entry[2] += grad.y * ux + grad.x * uy;
                }
            }
        }
        strain
    }

    /// Compute (and cache) nodal strain and stress.
    ///
    /// Strains of nonlocal groups are smoothed with the influence kernel
    /// before Hooke's law is applied; the thermoelastic part of the
    /// stress is subtracted when the solve carried a temperature change.
    /// Idempotent: later calls return the cached fields.
    pub fn calc_strain_and_stress(&mut self) -> Result<&StrainStress> {
        if self.fields.is_none() {
            let proxy = self.proxy;
            let raw = self.strain_in_qnodes();

            let smoothed: Vec<[f64; 3]> = (0..proxy.elements_count())
                .into_par_iter()
                .flat_map_iter(|e_l| {
                    let model = &self.materials[proxy.group_of(e_l)].model;
                    let neighbors = self.neighbors;
                    let shift = proxy.quad_shift(e_l);
                    let raw = &raw;
                    (0..proxy.qnodes_count(e_l)).map(move |q_l| {
                        let local = raw[shift + q_l];
                        match (model.theory(), model.influence()) {
                            (Theory::Nonlocal, Some(kernel)) => {
                                let x_l = proxy.quad_coord(e_l, q_l);
                                let mut nonlocal = [0.0; 3];
                                for &e_nl in neighbors.neighbors(e_l) {
                                    let tables_nl = proxy.tables(e_nl);
                                    let shift_nl = proxy.quad_shift(e_nl);
                                    for q_nl in 0..tables_nl.qnodes_count() {
                                        let weight = tables_nl.weight(q_nl)
                                            * proxy.jacobian(e_nl, q_nl)
                                            * kernel.value(&x_l, &proxy.quad_coord(e_nl, q_nl));
                                        for c in 0..3 {
                                            nonlocal[c] += raw[shift_nl + q_nl][c] * weight;
                                        }
                                    }
                                }
                                let p1 = model.local_weight();
                                let p2 = model.nonlocal_weight();
                                [
                                    p1 * local[0] + p2 * nonlocal[0],
                                    p1 * local[1] + p2 * nonlocal[1],
                                    p1 * local[2] + p2 * nonlocal[2],
                                ]
                            }
                            _ => local,
                        }
                    })
                })
                .collect();

            let delta_qnodes = self
                .delta_temperature
                .as_ref()
                .map(|delta| postprocess::nodes_to_qnodes(proxy, delta));

            let mut stress = vec![[0.0; 3]; proxy.total_qnodes()];
            for e in 0..proxy.elements_count() {
                let group = proxy.group_of(e);
                let [c0, c1, c2] = self.materials[group].physical.coeffs();
                let physical = &self.materials[group].physical;
                let factor = physical.thermal_expansion * physical.youngs_modulus
                    / (1.0 - physical.poissons_ratio);
                let shift = proxy.quad_shift(e);
                for q in 0..proxy.qnodes_count(e) {
                    let eps = smoothed[shift + q];
                    let thermal = delta_qnodes
                        .as_ref()
                        .map_or(0.0, |delta| factor * delta[shift + q]);
                    stress[shift + q] = [
                        c0 * eps[0] + c1 * eps[1] - thermal,
                        c1 * eps[0] + c0 * eps[1] - thermal,
                        c2 * eps[2],
                    ];
                }
            }

            let project = |values: &[[f64; 3]], c: usize| {
                let component: Vec<f64> = values.iter().map(|v| v[c]).collect();
                postprocess::qnodes_to_nodes(proxy, &component)
            };
            self.fields = Some(StrainStress {
                strain: [
                    project(&smoothed, 0)?,
                    project(&smoothed, 1)?,
                    project(&smoothed, 2)?,
                ],
                stress: [
                    project(&stress, 0)?,
                    project(&stress, 1)?,
                    project(&stress, 2)?,
                ],
            });
        }
        Ok(self.fields.as_ref().expect("fields cached above"))
    }

    /// The cached fields, if [`Self::calc_strain_and_stress`] has run.
    pub fn fields(&self) -> Option<&StrainStress> {
        self.fields.as_ref()
    }

    /// Write the mesh and displacement components (plus stresses, if
    /// computed) as a legacy-VTK unstructured grid.
    pub fn save_as_vtk<W: std::io::Write>(&self, w: &mut W) -> Result<()> {
        let n = self.proxy.nodes_count();
        let ux: Vec<f64> = (0..n)
            .map(|v| self.displacement[vector_dof(v, Comp::X)])
            .collect();
        let uy: Vec<f64> = (0..n)
            .map(|v| self.displacement[vector_dof(v, Comp::Y)])
            .collect();
        let mut point_data: Vec<(&str, &[f64])> = vec![("u_x", &ux), ("u_y", &uy)];
        if let Some(fields) = self.fields() {
            point_data.push(("stress_xx", &fields.stress[0]));
            point_data.push(("stress_yy", &fields.stress[1]));
            point_data.push(("stress_xy", &fields.stress[2]));
        }
        crate::io::save_as_vtk(w, self.proxy.mesh(), &point_data)
    }

    /// Nodal plane-stress von Mises stress
    /// `√(σ_xx² - σ_xx σ_yy + σ_yy² + 3 τ_xy²)`.
    pub fn von_mises(&mut self) -> Result<Vec<f64>> {
        let fields = self.calc_strain_and_stress()?;
        let [sxx, syy, sxy] = &fields.stress;
        Ok((0..sxx.len())
            .map(|v| {
                (sxx[v] * sxx[v] - sxx[v] * syy[v] + syy[v] * syy[v] + 3.0 * sxy[v] * sxy[v])
                    .max(0.0)
                    .sqrt()
            })
            .collect())
    }
}
