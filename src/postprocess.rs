//! Transfer of fields between nodes and quadrature nodes.
//!
//! Gradient, flux, and strain recovery all produce values at quadrature
//! nodes; projecting them back to nodal values is an element-local
//! consistent-mass solve followed by averaging over the elements
//! incident to each node. The local solve reproduces any field in the
//! element's basis span exactly, so a linear field survives the
//! nodes → qnodes → nodes round trip unchanged.

use crate::error::{Error, Result};
use crate::proxy::MeshProxy;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Interpolate a nodal field to every quadrature node.
///
/// The result is indexed by the global quadrature shift.
pub fn nodes_to_qnodes(proxy: &MeshProxy, nodal: &[f64]) -> Vec<f64> {
    let mut values = vec![0.0; proxy.total_qnodes()];
    for e in 0..proxy.elements_count() {
        let tables = proxy.tables(e);
        let nodes = &proxy.mesh().element(e).nodes;
        let shift = proxy.quad_shift(e);
        for q in 0..tables.qnodes_count() {
            values[shift + q] = nodes
                .iter()
                .enumerate()
                .map(|(i, &node)| nodal[node] * tables.qn(i, q))
                .sum();
        }
    }
    values
}

/// Project a per-quadrature-node field back to nodal values.
///
/// Per element, solves `M u = b` with the consistent element mass matrix
/// `M_ij = Σ_q w |det J| N_i N_j` and `b_i = Σ_q w |det J| N_i f_q`;
/// nodal results of incident elements are averaged.
pub fn qnodes_to_nodes(proxy: &MeshProxy, qvalues: &[f64]) -> Result<Vec<f64>> {
    debug_assert_eq!(qvalues.len(), proxy.total_qnodes());

    let local: Vec<Vec<f64>> = (0..proxy.elements_count())
        .into_par_iter()
        .map(|e| {
            let tables = proxy.tables(e);
            let n = proxy.mesh().element(e).nodes.len();
            let mut mass = DMatrix::zeros(n, n);
            let mut rhs = DVector::zeros(n);
            let shift = proxy.quad_shift(e);
            for q in 0..tables.qnodes_count() {
                let scale = tables.weight(q) * proxy.jacobian(e, q);
                for i in 0..n {
                    rhs[i] += scale * tables.qn(i, q) * qvalues[shift + q];
                    for j in 0..n {
                        mass[(i, j)] += scale * tables.qn(i, q) * tables.qn(j, q);
                    }
                }
            }
            mass.lu()
                .solve(&rhs)
                .map(|u| u.as_slice().to_vec())
                .ok_or_else(|| {
                    Error::Numerical(format!("singular mass matrix in element {}", e))
                })
        })
        .collect::<Result<_>>()?;

    let mut sums = vec![0.0; proxy.nodes_count()];
    let mut counts = vec![0usize; proxy.nodes_count()];
    for (e, values) in local.iter().enumerate() {
        for (i, &node) in proxy.mesh().element(e).nodes.iter().enumerate() {
            sums[node] += values[i];
            counts[node] += 1;
        }
    }
    Ok(sums
        .into_iter()
        .zip(counts)
        .map(|(sum, count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect())
}

/// Integrate a per-quadrature-node field over the domain.
pub fn integrate(proxy: &MeshProxy, qvalues: &[f64]) -> f64 {
    debug_assert_eq!(qvalues.len(), proxy.total_qnodes());
    (0..proxy.elements_count())
        .map(|e| {
            let tables = proxy.tables(e);
            let shift = proxy.quad_shift(e);
            (0..tables.qnodes_count())
                .map(|q| tables.weight(q) * proxy.jacobian(e, q) * qvalues[shift + q])
                .sum::<f64>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::mesh::Mesh;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    /// Deliberately skewed two-element mesh: averaging-based projection
    /// schemes lose linear exactness here, the mass solve must not.
    fn skewed_mesh() -> MeshProxy {
        let mut mesh = Mesh::new();
        mesh.add_node(Vector2::new(0.0, 0.0));
        mesh.add_node(Vector2::new(1.3, 0.1));
        mesh.add_node(Vector2::new(2.0, 0.0));
        mesh.add_node(Vector2::new(0.1, 0.9));
        mesh.add_node(Vector2::new(1.1, 1.2));
        mesh.add_node(Vector2::new(2.2, 1.1));
        mesh.add_element(ElementKind::Bilinear, vec![0, 1, 4, 3]).unwrap();
        mesh.add_element(ElementKind::Bilinear, vec![1, 2, 5, 4]).unwrap();
        MeshProxy::new(mesh).unwrap()
    }

    #[test]
    fn test_linear_round_trip() {
        let proxy = skewed_mesh();
        let f = |p: Vector2<f64>| 2.0 * p.x - 3.0 * p.y + 0.7;
        let nodal: Vec<f64> = (0..proxy.nodes_count())
            .map(|v| f(proxy.mesh().node(v)))
            .collect();

        let qvalues = nodes_to_qnodes(&proxy, &nodal);
        let recovered = qnodes_to_nodes(&proxy, &qvalues).unwrap();
        for (a, b) in nodal.iter().zip(&recovered) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_round_trip_on_quadratic_elements() {
        let mut mesh = Mesh::new();
        mesh.add_node(Vector2::new(0.0, 0.0));
        mesh.add_node(Vector2::new(1.0, 0.0));
        mesh.add_node(Vector2::new(0.0, 1.0));
        mesh.add_node(Vector2::new(0.5, 0.0));
        mesh.add_node(Vector2::new(0.5, 0.5));
        mesh.add_node(Vector2::new(0.0, 0.5));
        mesh.add_element(ElementKind::QuadraticTriangle, vec![0, 1, 2, 3, 4, 5])
            .unwrap();
        let proxy = MeshProxy::new(mesh).unwrap();

        // A quadratic field is in the basis span of the element
        let f = |p: Vector2<f64>| p.x * p.x + p.y * p.y - p.x * p.y;
        let nodal: Vec<f64> = (0..6).map(|v| f(proxy.mesh().node(v))).collect();
        let recovered = qnodes_to_nodes(&proxy, &nodes_to_qnodes(&proxy, &nodal)).unwrap();
        for (a, b) in nodal.iter().zip(&recovered) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_integrate_constant() {
        let proxy = skewed_mesh();
        let ones = vec![1.0; proxy.total_qnodes()];
        // The integral of 1 equals the mesh area: shoelace over both quads
        let area = |a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>, d: Vector2<f64>| {
            0.5 * ((a.x * b.y - b.x * a.y)
                + (b.x * c.y - c.x * b.y)
                + (c.x * d.y - d.x * c.y)
                + (d.x * a.y - a.x * d.y))
        };
        let n = |v: usize| proxy.mesh().node(v);
        let expected = area(n(0), n(1), n(4), n(3)) + area(n(1), n(2), n(5), n(4));
        assert_relative_eq!(integrate(&proxy, &ones), expected, epsilon = 1e-12);
    }
}
