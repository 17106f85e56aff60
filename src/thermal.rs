//! Stationary heat conduction with the local/nonlocal mixed theory.
//!
//! Solves `-div(k grad u) = f` on the mesh, with per-group conductivity
//! tensors and nonlocal models, TEMPERATURE/FLUX boundary conditions,
//! and a volume source term. The solution object recovers the heat flux
//! (with the same local+nonlocal decomposition) and integrates the
//! temperature field for diagnostics.

use crate::assembly::{self, BilinearForm};
use crate::boundary::{self, BoundaryConditions, HeatBc};
use crate::error::Result;
use crate::influence::Influence;
use crate::material::{self, MaterialGroup, Materials, Model, Theory, ThermalProperties};
use crate::neighborhood::NeighborTable;
use crate::parallel::{node_range, Communicator};
use crate::postprocess;
use crate::proxy::MeshProxy;
use crate::solver::Solver;
use crate::sparsity;
use crate::types::{Point2, Vec2};
use log::debug;
use nalgebra::Matrix2;
use rayon::prelude::*;

/// Heat-conduction bilinear form: `∫ ∇v · k ∇u`.
struct ThermalForm {
    conductivities: Vec<Matrix2<f64>>,
}

impl BilinearForm for ThermalForm {
    fn components(&self) -> usize {
        1
    }

    fn local(&self, proxy: &MeshProxy, e: usize, i: usize, j: usize, _ci: usize, _cj: usize) -> f64 {
        let k = &self.conductivities[proxy.group_of(e)];
        let tables = proxy.tables(e);
        (0..tables.qnodes_count())
            .map(|q| {
                let grad_i = proxy.derivatives(e, i, q);
                let grad_j = proxy.derivatives(e, j, q);
                tables.weight(q) * proxy.jacobian(e, q) * grad_i.dot(&(k * grad_j))
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
        _ci: usize,
        _cj: usize,
        kernel: &Influence,
    ) -> f64 {
        let k = &self.conductivities[proxy.group_of(e_l)];
        let tables_l = proxy.tables(e_l);
        let tables_nl = proxy.tables(e_nl);
        let mut integral = 0.0;
        for q_l in 0..tables_l.qnodes_count() {
            let x_l = proxy.quad_coord(e_l, q_l);
            // Kernel-weighted inner integral over the neighbor, factored
            // out per outer quadrature node.
            let mut inner = Vec2::zeros();
            for q_nl in 0..tables_nl.qnodes_count() {
                let weight = tables_nl.weight(q_nl)
                    * proxy.jacobian(e_nl, q_nl)
                    * kernel.value(&x_l, &proxy.quad_coord(e_nl, q_nl));
                inner += proxy.derivatives(e_nl, j_nl, q_nl) * weight;
            }
            let grad_i = proxy.derivatives(e_l, i_l, q_l);
            integral += tables_l.weight(q_l) * proxy.jacobian(e_l, q_l) * grad_i.dot(&(k * inner));
        }
        integral
    }
}

/// Volume source contribution `∫ f N_i` for the rows this rank owns.
fn assemble_source(
    proxy: &MeshProxy,
    right_part: &(dyn Fn(Point2) -> f64 + Sync),
    range: &std::ops::Range<usize>,
) -> Vec<f64> {
    (0..proxy.nodes_count())
        .into_par_iter()
        .map(|node| {
            if !range.contains(&node) {
                return 0.0;
            }
            let mut value = 0.0;
            for &e in proxy.node_elements(node) {
                let i = proxy
                    .global_to_local(e, node)
                    .expect("node incidence matches element connectivity");
                let tables = proxy.tables(e);
                for q in 0..tables.qnodes_count() {
                    value += tables.weight(q)
                        * proxy.jacobian(e, q)
                        * tables.qn(i, q)
                        * right_part(proxy.quad_coord(e, q));
                }
            }
            value
        })
        .collect()
}

/// Solve the stationary heat equation.
///
/// `neighbors` must cover every group whose model runs the nonlocal
/// theory (build it with the groups' search radii); pass an empty table
/// for purely local runs.
pub fn stationary_heat_equation<'a>(
    proxy: &'a MeshProxy,
    neighbors: &'a NeighborTable,
    materials: &Materials<ThermalProperties>,
    conditions: &BoundaryConditions<HeatBc>,
    right_part: impl Fn(Point2) -> f64 + Sync,
    solver: &dyn Solver,
    comm: &dyn Communicator,
) -> Result<HeatSolution<'a>> {
    let resolved = material::resolve(proxy, materials)?;
    let models: Vec<&Model> = resolved.iter().map(|m| &m.model).collect();
    let theories: Vec<Theory> = models.iter().map(|m| m.theory()).collect();
    let form = ThermalForm {
        conductivities: resolved
            .iter()
            .map(|m| m.physical.conductivity.tensor())
            .collect(),
    };

    let dirichlet = boundary::thermal_dirichlet_flags(proxy, conditions)?;
    let range = node_range(proxy.nodes_count(), comm.rank(), comm.size());
    let pattern = sparsity::analyze(proxy, neighbors, &theories, &dirichlet, 1, &range);
    let system = assembly::assemble(proxy, neighbors, &models, &dirichlet, pattern, &form, &range);

    let mut f = assemble_source(proxy, &right_part, &range);
    boundary::apply_thermal(proxy, conditions, &system.kb, &mut f)?;

    debug!("solving thermal system with {}", solver.name());
    let temperature = solver.solve(&system.k.to_symmetric_csr(), &f)?;

    Ok(HeatSolution {
        proxy,
        neighbors,
        materials: resolved.into_iter().cloned().collect(),
        temperature,
        flux: None,
    })
}

/// A solved temperature field with post-processing.
pub struct HeatSolution<'a> {
    proxy: &'a MeshProxy,
    neighbors: &'a NeighborTable,
    materials: Vec<MaterialGroup<ThermalProperties>>,
    temperature: Vec<f64>,
    flux: Option<[Vec<f64>; 2]>,
}

impl<'a> HeatSolution<'a> {
    /// Nodal temperatures.
    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    /// The mesh proxy the solution lives on.
    pub fn proxy(&self) -> &MeshProxy {
        self.proxy
    }

    /// Raw temperature gradient at every quadrature node.
    fn gradient_in_qnodes(&self) -> Vec<Vec2> {
        let proxy = self.proxy;
        let mut gradient = vec![Vec2::zeros(); proxy.total_qnodes()];
        for e in 0..proxy.elements_count() {
            let shift = proxy.quad_shift(e);
            let nodes = &proxy.mesh().element(e).nodes;
            for q in 0..proxy.qnodes_count(e) {
                for (i, &node) in nodes.iter().enumerate() {
                    gradient[shift + q] += proxy.derivatives(e, i, q) * self.temperature[node];
                }
            }
        }
        gradient
    }

    /// Compute the nodal heat flux `q = -k ∇u`, smoothing the gradient
    /// of nonlocal groups with their influence kernel.
    ///
    /// Idempotent: the first call computes and caches, later calls
    /// return the cached field.
    pub fn calc_flux(&mut self) -> Result<&[Vec<f64>; 2]> {
        if self.flux.is_none() {
            let proxy = self.proxy;
            let gradient = self.gradient_in_qnodes();

            let smoothed: Vec<Vec2> = (0..proxy.elements_count())
                .into_par_iter()
                .flat_map_iter(|e_l| {
                    let model = &self.materials[proxy.group_of(e_l)].model;
                    let neighbors = self.neighbors;
                    let shift = proxy.quad_shift(e_l);
                    let gradient = &gradient;
                    (0..proxy.qnodes_count(e_l)).map(move |q_l| {
                        let local = gradient[shift + q_l];
                        match (model.theory(), model.influence()) {
                            (Theory::Nonlocal, Some(kernel)) => {
                                let x_l = proxy.quad_coord(e_l, q_l);
                                let mut nonlocal = Vec2::zeros();
                                for &e_nl in neighbors.neighbors(e_l) {
                                    let tables_nl = proxy.tables(e_nl);
                                    let shift_nl = proxy.quad_shift(e_nl);
                                    for q_nl in 0..tables_nl.qnodes_count() {
                                        let weight = tables_nl.weight(q_nl)
                                            * proxy.jacobian(e_nl, q_nl)
                                            * kernel
                                                .value(&x_l, &proxy.quad_coord(e_nl, q_nl));
                                        nonlocal += gradient[shift_nl + q_nl] * weight;
                                    }
                                }
                                local * model.local_weight()
                                    + nonlocal * model.nonlocal_weight()
                            }
                            _ => local,
                        }
                    })
                })
                .collect();

            let mut qx = vec![0.0; proxy.total_qnodes()];
            let mut qy = vec![0.0; proxy.total_qnodes()];
            for e in 0..proxy.elements_count() {
                let k = self.materials[proxy.group_of(e)]
                    .physical
                    .conductivity
                    .tensor();
                let shift = proxy.quad_shift(e);
                for q in 0..proxy.qnodes_count(e) {
                    let flux = -(k * smoothed[shift + q]);
                    qx[shift + q] = flux.x;
                    qy[shift + q] = flux.y;
                }
            }

            self.flux = Some([
                postprocess::qnodes_to_nodes(proxy, &qx)?,
                postprocess::qnodes_to_nodes(proxy, &qy)?,
            ]);
        }
        Ok(self.flux.as_ref().expect("flux cached above"))
    }

    /// The cached nodal flux, if [`Self::calc_flux`] has run.
    pub fn flux(&self) -> Option<&[Vec<f64>; 2]> {
        self.flux.as_ref()
    }

    /// Write the mesh and temperature (plus the flux, if computed) as a
    /// legacy-VTK unstructured grid.
    pub fn save_as_vtk<W: std::io::Write>(&self, w: &mut W) -> Result<()> {
        let mut point_data: Vec<(&str, &[f64])> = vec![("temperature", &self.temperature)];
        if let Some([qx, qy]) = self.flux() {
            point_data.push(("flux_x", qx));
            point_data.push(("flux_y", qy));
        }
        crate::io::save_as_vtk(w, self.proxy.mesh(), &point_data)
    }

    /// Write the temperature as `x,y,value` rows.
    pub fn save_as_csv<W: std::io::Write>(&self, w: &mut W) -> Result<()> {
        crate::io::save_as_csv(w, self.proxy.mesh(), &self.temperature)
    }

    /// Integrate the temperature over the domain, reduced across ranks.
    ///
    /// Each rank integrates the elements whose first node it owns.
    pub fn integrate_solution(&self, comm: &dyn Communicator) -> f64 {
        let proxy = self.proxy;
        let range = node_range(proxy.nodes_count(), comm.rank(), comm.size());
        let local: f64 = (0..proxy.elements_count())
            .filter(|&e| {
                let first = *proxy
                    .mesh()
                    .element(e)
                    .nodes
                    .iter()
                    .min()
                    .expect("elements have nodes");
                range.contains(&first)
            })
            .map(|e| {
                let tables = proxy.tables(e);
                let nodes = &proxy.mesh().element(e).nodes;
                (0..tables.qnodes_count())
                    .map(|q| {
                        let value: f64 = nodes
                            .iter()
                            .enumerate()
                            .map(|(i, &node)| self.temperature[node] * tables.qn(i, q))
                            .sum();
                        tables.weight(q) * proxy.jacobian(e, q) * value
                    })
                    .sum::<f64>()
            })
            .sum();
        comm.sum(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::material::Conductivity;
    use crate::mesh::Mesh;
    use crate::parallel::SerialComm;
    use crate::solver::FaerCholeskySolver;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;
    use std::collections::BTreeMap;

    fn single_material(conductivity: Conductivity) -> Materials<ThermalProperties> {
        let mut materials = BTreeMap::new();
        materials.insert(
            "default".to_owned(),
            MaterialGroup {
                physical: ThermalProperties::new(conductivity).unwrap(),
                model: Model::local(),
            },
        );
        materials
    }

    /// n×n unit-square bilinear grid with the four sides as boundary
    /// groups.
    pub(crate) fn unit_square_grid(n: usize) -> MeshProxy {
        use crate::element::EdgeKind;
        let mut mesh = Mesh::new();
        for j in 0..=n {
            for i in 0..=n {
                mesh.add_node(Vector2::new(i as f64 / n as f64, j as f64 / n as f64));
            }
        }
        let id = |i: usize, j: usize| j * (n + 1) + i;
        for j in 0..n {
            for i in 0..n {
                mesh.add_element(
                    ElementKind::Bilinear,
                    vec![id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)],
                )
                .unwrap();
            }
        }
        for i in 0..n {
            mesh.add_boundary_edge("Down", EdgeKind::Linear, vec![id(i, 0), id(i + 1, 0)])
                .unwrap();
            mesh.add_boundary_edge("Up", EdgeKind::Linear, vec![id(i, n), id(i + 1, n)])
                .unwrap();
            mesh.add_boundary_edge("Left", EdgeKind::Linear, vec![id(0, i), id(0, i + 1)])
                .unwrap();
            mesh.add_boundary_edge("Right", EdgeKind::Linear, vec![id(n, i), id(n, i + 1)])
                .unwrap();
        }
        MeshProxy::new(mesh).unwrap()
    }

    fn dirichlet_everywhere(f: fn(Point2) -> f64) -> BoundaryConditions<HeatBc> {
        let mut conditions = BoundaryConditions::new();
        for name in ["Down", "Up", "Left", "Right"] {
            conditions.insert(name.to_owned(), HeatBc::Temperature(Box::new(f)));
        }
        conditions
    }

    #[test]
    fn test_patch_test_linear_field() {
        // u = 2x + 3y - 1 with matching Dirichlet data is reproduced
        // exactly on the patch (zero source).
        let proxy = unit_square_grid(3);
        let neighbors = NeighborTable::empty(proxy.elements_count());
        let solution = stationary_heat_equation(
            &proxy,
            &neighbors,
            &single_material(Conductivity::Isotropic(2.5)),
            &dirichlet_everywhere(|p| 2.0 * p.x + 3.0 * p.y - 1.0),
            |_| 0.0,
            &FaerCholeskySolver::new(),
            &SerialComm,
        )
        .unwrap();

        for v in 0..proxy.nodes_count() {
            let p = proxy.mesh().node(v);
            assert_relative_eq!(
                solution.temperature()[v],
                2.0 * p.x + 3.0 * p.y - 1.0,
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_patch_test_anisotropic() {
        let proxy = unit_square_grid(2);
        let neighbors = NeighborTable::empty(proxy.elements_count());
        let solution = stationary_heat_equation(
            &proxy,
            &neighbors,
            &single_material(Conductivity::Anisotropic([[2.0, 0.5], [0.5, 1.0]])),
            &dirichlet_everywhere(|p| p.x - 4.0 * p.y),
            |_| 0.0,
            &FaerCholeskySolver::new(),
            &SerialComm,
        )
        .unwrap();

        for v in 0..proxy.nodes_count() {
            let p = proxy.mesh().node(v);
            assert_relative_eq!(solution.temperature()[v], p.x - 4.0 * p.y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_flux_of_linear_field_is_constant() {
        let proxy = unit_square_grid(3);
        let neighbors = NeighborTable::empty(proxy.elements_count());
        let mut solution = stationary_heat_equation(
            &proxy,
            &neighbors,
            &single_material(Conductivity::Isotropic(2.0)),
            &dirichlet_everywhere(|p| 3.0 * p.x - p.y),
            |_| 0.0,
            &FaerCholeskySolver::new(),
            &SerialComm,
        )
        .unwrap();

        let [qx, qy] = solution.calc_flux().unwrap();
        // q = -k ∇u = -2 (3, -1)
        for v in 0..proxy.nodes_count() {
            assert_relative_eq!(qx[v], -6.0, epsilon = 1e-9);
            assert_relative_eq!(qy[v], 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_flux_is_cached() {
        let proxy = unit_square_grid(2);
        let neighbors = NeighborTable::empty(proxy.elements_count());
        let mut solution = stationary_heat_equation(
            &proxy,
            &neighbors,
            &single_material(Conductivity::Isotropic(1.0)),
            &dirichlet_everywhere(|p| p.x),
            |_| 0.0,
            &FaerCholeskySolver::new(),
            &SerialComm,
        )
        .unwrap();

        assert!(solution.flux().is_none());
        let first = solution.calc_flux().unwrap().clone();
        let second = solution.calc_flux().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_integrate_linear_solution() {
        let proxy = unit_square_grid(4);
        let neighbors = NeighborTable::empty(proxy.elements_count());
        let solution = stationary_heat_equation(
            &proxy,
            &neighbors,
            &single_material(Conductivity::Isotropic(1.0)),
            &dirichlet_everywhere(|p| p.x),
            |_| 0.0,
            &FaerCholeskySolver::new(),
            &SerialComm,
        )
        .unwrap();
        // ∫ x over the unit square = 1/2
        assert_relative_eq!(
            solution.integrate_solution(&SerialComm),
            0.5,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_bilinear_form_is_symmetric() {
        // Symmetry of the assembled matrix reduces to symmetry of the
        // integrands under (e_l, i) ↔ (e_nl, j) exchange.
        let proxy = unit_square_grid(2);
        let form = ThermalForm {
            conductivities: vec![Conductivity::Anisotropic([[2.0, 0.5], [0.5, 1.0]]).tensor()],
        };
        let kernel = Influence::polynomial([2.0, 2.0], 2, 1).unwrap();

        for e in 0..proxy.elements_count() {
            for i in 0..4 {
                for j in 0..4 {
                    assert_relative_eq!(
                        form.local(&proxy, e, i, j, 0, 0),
                        form.local(&proxy, e, j, i, 0, 0),
                        epsilon = 1e-14
                    );
                }
            }
        }
        for (e_l, e_nl) in [(0, 1), (2, 3), (0, 3)] {
            for i in 0..4 {
                for j in 0..4 {
                    let forward = form.nonlocal(&proxy, e_l, e_nl, i, j, 0, 0, &kernel);
                    let transposed = form.nonlocal(&proxy, e_nl, e_l, j, i, 0, 0, &kernel);
                    assert_relative_eq!(forward, transposed, epsilon = 1e-12, max_relative = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_missing_material_is_config_error() {
        let proxy = unit_square_grid(2);
        let neighbors = NeighborTable::empty(proxy.elements_count());
        let materials: Materials<ThermalProperties> = BTreeMap::new();
        let result = stationary_heat_equation(
            &proxy,
            &neighbors,
            &materials,
            &dirichlet_everywhere(|p| p.x),
            |_| 0.0,
            &FaerCholeskySolver::new(),
            &SerialComm,
        );
        assert!(matches!(result, Err(crate::error::Error::Config(_))));
    }
}
