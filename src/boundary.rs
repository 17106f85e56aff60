//! Boundary-condition types and their application to the assembled
//! system.
//!
//! Order of operations is fixed: Neumann (flux/force) edge integrals are
//! added to the right-hand side first, then known Dirichlet values are
//! eliminated through the boundary block K_b, then the Dirichlet DOFs
//! themselves are pinned. Pinning last keeps the identity rows written
//! by the assembler consistent with the right-hand side.
//!
//! When a node lies on several Dirichlet boundaries, the group that
//! appears first in the mesh's boundary list wins.

use crate::error::{Error, Result};
use crate::mesh::BoundaryEdge;
use crate::proxy::MeshProxy;
use crate::sparse::CsrBlock;
use crate::types::{Comp, Point2};
use std::collections::BTreeMap;

/// A boundary-value function of the physical coordinate.
pub type BoundaryFn = Box<dyn Fn(Point2) -> f64 + Send + Sync>;

/// Wrap a constant boundary value.
pub fn constant_bc(value: f64) -> BoundaryFn {
    Box::new(move |_| value)
}

/// Boundary condition of the thermal problem, per boundary group.
pub enum HeatBc {
    /// Dirichlet: prescribed temperature.
    Temperature(BoundaryFn),
    /// Neumann: prescribed normal heat flux.
    Flux(BoundaryFn),
}

/// Boundary condition of one displacement component.
pub enum ComponentBc {
    /// Dirichlet: prescribed displacement.
    Translation(BoundaryFn),
    /// Neumann: prescribed traction component.
    Force(BoundaryFn),
    /// Natural (traction-free) component.
    Free,
}

/// Boundary condition of the mechanical problem, per boundary group.
pub struct MechanicalBc {
    pub x: ComponentBc,
    pub y: ComponentBc,
}

/// Boundary conditions keyed by boundary-group name.
pub type BoundaryConditions<B> = BTreeMap<String, B>;

fn check_groups<B>(proxy: &MeshProxy, conditions: &BoundaryConditions<B>) -> Result<()> {
    for name in conditions.keys() {
        if proxy.mesh().boundary(name).is_none() {
            return Err(Error::Config(format!(
                "field \"boundary\" names unknown boundary group \"{}\"",
                name
            )));
        }
    }
    Ok(())
}

/// Edge quadrature of `∫ f(x) N_i(x) |t(x)| dξ`.
fn integrate_edge<F>(proxy: &MeshProxy, edge: &BoundaryEdge, i: usize, f: &F) -> f64
where
    F: Fn(Point2) -> f64 + ?Sized,
{
    let tables = edge.kind.tables();
    let (coords, tangents) = proxy.edge_quad_data(edge);
    (0..tables.qnodes_count())
        .map(|q| f(coords[q]) * tables.weight(q) * tables.qn(i, q) * tangents[q])
        .sum()
}

/// Subtract the known Dirichlet contributions from the right-hand side
/// and pin the Dirichlet DOFs to their values.
fn eliminate_and_pin(kb: &CsrBlock, values: &[Option<f64>], f: &mut [f64]) {
    for r in 0..f.len() {
        if values[r].is_some() {
            continue;
        }
        for (col, coupling) in kb.row(r) {
            if let Some(value) = values[col] {
                f[r] -= coupling * value;
            }
        }
    }
    for (dof, value) in values.iter().enumerate() {
        if let Some(value) = value {
            f[dof] = *value;
        }
    }
}

/// Dirichlet flags (one per node) of the thermal problem.
pub(crate) fn thermal_dirichlet_flags(
    proxy: &MeshProxy,
    conditions: &BoundaryConditions<HeatBc>,
) -> Result<Vec<bool>> {
    check_groups(proxy, conditions)?;
    let mut flags = vec![false; proxy.nodes_count()];
    for (name, edges) in proxy.mesh().boundaries() {
        if let Some(HeatBc::Temperature(_)) = conditions.get(name) {
            for edge in edges {
                for &node in &edge.nodes {
                    flags[node] = true;
                }
            }
        }
    }
    Ok(flags)
}

/// Apply thermal boundary conditions to the right-hand side.
pub(crate) fn apply_thermal(
    proxy: &MeshProxy,
    conditions: &BoundaryConditions<HeatBc>,
    kb: &CsrBlock,
    f: &mut [f64],
) -> Result<()> {
    check_groups(proxy, conditions)?;

    for (name, edges) in proxy.mesh().boundaries() {
        if let Some(HeatBc::Flux(fun)) = conditions.get(name) {
            for edge in edges {
                for (i, &node) in edge.nodes.iter().enumerate() {
                    f[node] += integrate_edge(proxy, edge, i, fun);
                }
            }
        }
    }

    let mut values = vec![None; proxy.nodes_count()];
    for (name, edges) in proxy.mesh().boundaries() {
        if let Some(HeatBc::Temperature(fun)) = conditions.get(name) {
            for edge in edges {
                for &node in &edge.nodes {
                    if values[node].is_none() {
                        values[node] = Some(fun(proxy.mesh().node(node)));
                    }
                }
            }
        }
    }
    eliminate_and_pin(kb, &values, f);
    Ok(())
}

/// Dirichlet flags (two per node) of the mechanical problem.
pub(crate) fn mechanical_dirichlet_flags(
    proxy: &MeshProxy,
    conditions: &BoundaryConditions<MechanicalBc>,
) -> Result<Vec<bool>> {
    check_groups(proxy, conditions)?;
    let mut flags = vec![false; 2 * proxy.nodes_count()];
    for (name, edges) in proxy.mesh().boundaries() {
        if let Some(bc) = conditions.get(name) {
            for (comp, component_bc) in [(Comp::X, &bc.x), (Comp::Y, &bc.y)] {
                if matches!(component_bc, ComponentBc::Translation(_)) {
                    for edge in edges {
                        for &node in &edge.nodes {
                            flags[crate::types::vector_dof(node, comp)] = true;
                        }
                    }
                }
            }
        }
    }
    Ok(flags)
}

/// Apply mechanical boundary conditions to the right-hand side.
pub(crate) fn apply_mechanical(
    proxy: &MeshProxy,
    conditions: &BoundaryConditions<MechanicalBc>,
    kb: &CsrBlock,
    f: &mut [f64],
) -> Result<()> {
    check_groups(proxy, conditions)?;

    for (name, edges) in proxy.mesh().boundaries() {
        if let Some(bc) = conditions.get(name) {
            for (comp, component_bc) in [(Comp::X, &bc.x), (Comp::Y, &bc.y)] {
                if let ComponentBc::Force(fun) = component_bc {
                    for edge in edges {
                        for (i, &node) in edge.nodes.iter().enumerate() {
                            f[crate::types::vector_dof(node, comp)] +=
                                integrate_edge(proxy, edge, i, fun);
                        }
                    }
                }
            }
        }
    }

    let mut values = vec![None; 2 * proxy.nodes_count()];
    for (name, edges) in proxy.mesh().boundaries() {
        if let Some(bc) = conditions.get(name) {
            for (comp, component_bc) in [(Comp::X, &bc.x), (Comp::Y, &bc.y)] {
                if let ComponentBc::Translation(fun) = component_bc {
                    for edge in edges {
                        for &node in &edge.nodes {
                            let dof = crate::types::vector_dof(node, comp);
                            if values[dof].is_none() {
                                values[dof] = Some(fun(proxy.mesh().node(node)));
                            }
                        }
                    }
                }
            }
        }
    }
    eliminate_and_pin(kb, &values, f);
    Ok(())
}
