//! Mesh proxy: the immutable geometry cache derived from a mesh.
//!
//! Built once after mesh construction, the proxy stores for every
//! element and quadrature node the Jacobian matrix, its determinant, and
//! the physical quadrature coordinate, plus the inverted node-to-element
//! incidence and the material-group assignment. All lookups are O(1)
//! afterwards; the cache is Θ(#elements × #qnodes).
//!
//! Quadrature data is addressed either as `(element, q)` or through the
//! element's global quadrature shift, which linearizes all quadrature
//! nodes of the mesh into one index space.

use crate::element::ShapeTables;
use crate::error::{Error, Result};
use crate::mesh::{BoundaryEdge, Mesh};
use crate::types::{Point2, Vec2};

/// Geometry cache and derived incidence for a [`Mesh`].
pub struct MeshProxy {
    mesh: Mesh,
    quad_shifts: Vec<usize>,
    /// Per global qnode: [∂x/∂ξ, ∂x/∂η, ∂y/∂ξ, ∂y/∂η].
    jacobi: Vec<[f64; 4]>,
    dets: Vec<f64>,
    qcoords: Vec<Point2>,
    node_elements: Vec<Vec<usize>>,
    elem_group: Vec<usize>,
    group_names: Vec<String>,
    group_elements: Vec<Vec<usize>>,
}

impl MeshProxy {
    /// Build the geometry cache for a mesh, consuming it.
    ///
    /// If the mesh defines no material groups, all elements are placed
    /// in an implicit group named `"default"`.
    ///
    /// # Errors
    ///
    /// - `Error::Mesh` if some element belongs to no material group.
    /// - `Error::Numerical` if any quadrature node has a non-positive
    ///   Jacobian determinant (inverted or degenerate element).
    pub fn new(mesh: Mesh) -> Result<Self> {
        let (group_names, group_elements) = if mesh.groups().is_empty() {
            (
                vec!["default".to_owned()],
                vec![(0..mesh.elements_count()).collect::<Vec<_>>()],
            )
        } else {
            let names = mesh.groups().iter().map(|(n, _)| n.clone()).collect();
            let members = mesh.groups().iter().map(|(_, m)| m.clone()).collect();
            (names, members)
        };

        let mut elem_group = vec![usize::MAX; mesh.elements_count()];
        for (g, members) in group_elements.iter().enumerate() {
            for &e in members {
                elem_group[e] = g;
            }
        }
        if let Some(e) = elem_group.iter().position(|&g| g == usize::MAX) {
            return Err(Error::Mesh(format!(
                "element {} belongs to no material group",
                e
            )));
        }

        let mut quad_shifts = Vec::with_capacity(mesh.elements_count() + 1);
        quad_shifts.push(0);
        for element in mesh.elements() {
            let count = element.kind.tables().qnodes_count();
            quad_shifts.push(quad_shifts.last().unwrap() + count);
        }

        let total = *quad_shifts.last().unwrap();
        let mut jacobi = Vec::with_capacity(total);
        let mut dets = Vec::with_capacity(total);
        let mut qcoords = Vec::with_capacity(total);

        for (e, element) in mesh.elements().iter().enumerate() {
            let tables = element.kind.tables();
            for q in 0..tables.qnodes_count() {
                let mut j = [0.0; 4];
                let mut coord = Point2::zeros();
                for (i, &node) in element.nodes.iter().enumerate() {
                    let point = mesh.node(node);
                    let (nxi, neta) = (tables.qnxi(i, q), tables.qneta(i, q));
                    j[0] += point.x * nxi;
                    j[1] += point.x * neta;
                    j[2] += point.y * nxi;
                    j[3] += point.y * neta;
                    coord += point * tables.qn(i, q);
                }
                let det = j[0] * j[3] - j[1] * j[2];
                if det <= 0.0 {
                    return Err(Error::Numerical(format!(
                        "non-positive Jacobian determinant {} in element {} at quadrature node {}",
                        det, e, q
                    )));
                }
                jacobi.push(j);
                dets.push(det);
                qcoords.push(coord);
            }
        }

        let mut node_elements = vec![Vec::new(); mesh.nodes_count()];
        for (e, element) in mesh.elements().iter().enumerate() {
            for &node in &element.nodes {
                node_elements[node].push(e);
            }
        }

        Ok(Self {
            mesh,
            quad_shifts,
            jacobi,
            dets,
            qcoords,
            node_elements,
            elem_group,
            group_names,
            group_elements,
        })
    }

    /// The underlying mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Number of nodes.
    pub fn nodes_count(&self) -> usize {
        self.mesh.nodes_count()
    }

    /// Number of 2D elements.
    pub fn elements_count(&self) -> usize {
        self.mesh.elements_count()
    }

    /// Shape tables of element `e`.
    pub fn tables(&self, e: usize) -> &'static ShapeTables {
        self.mesh.element(e).kind.tables()
    }

    /// Global quadrature shift of element `e`.
    #[inline]
    pub fn quad_shift(&self, e: usize) -> usize {
        self.quad_shifts[e]
    }

    /// Number of quadrature nodes of element `e`.
    #[inline]
    pub fn qnodes_count(&self, e: usize) -> usize {
        self.quad_shifts[e + 1] - self.quad_shifts[e]
    }

    /// Total number of quadrature nodes over all elements.
    pub fn total_qnodes(&self) -> usize {
        *self.quad_shifts.last().unwrap()
    }

    /// Jacobian matrix at quadrature node `q` of element `e`, as
    /// `[∂x/∂ξ, ∂x/∂η, ∂y/∂ξ, ∂y/∂η]`.
    #[inline]
    pub fn jacobi_matrix(&self, e: usize, q: usize) -> [f64; 4] {
        self.jacobi[self.quad_shifts[e] + q]
    }

    /// Jacobian determinant at quadrature node `q` of element `e`.
    #[inline]
    pub fn jacobian(&self, e: usize, q: usize) -> f64 {
        self.dets[self.quad_shifts[e] + q]
    }

    /// Jacobian determinant at a global quadrature shift.
    #[inline]
    pub fn jacobian_at(&self, shift: usize) -> f64 {
        self.dets[shift]
    }

    /// Physical coordinate of quadrature node `q` of element `e`.
    #[inline]
    pub fn quad_coord(&self, e: usize, q: usize) -> Point2 {
        self.qcoords[self.quad_shifts[e] + q]
    }

    /// Physical coordinate at a global quadrature shift.
    #[inline]
    pub fn quad_coord_at(&self, shift: usize) -> Point2 {
        self.qcoords[shift]
    }

    /// Physical gradient `(∂N_i/∂x, ∂N_i/∂y)` of basis `i` at quadrature
    /// node `q` of element `e`, from `J^{-T} ∇N_i`.
    #[inline]
    pub fn derivatives(&self, e: usize, i: usize, q: usize) -> Vec2 {
        let shift = self.quad_shifts[e] + q;
        let [xxi, xeta, yxi, yeta] = self.jacobi[shift];
        let det = self.dets[shift];
        let tables = self.tables(e);
        let (nxi, neta) = (tables.qnxi(i, q), tables.qneta(i, q));
        Vec2::new(
            (nxi * yeta - neta * yxi) / det,
            (-nxi * xeta + neta * xxi) / det,
        )
    }

    /// Elements incident to node `v`, in ascending element order.
    #[inline]
    pub fn node_elements(&self, v: usize) -> &[usize] {
        &self.node_elements[v]
    }

    /// Local index of global node `v` within element `e`.
    pub fn global_to_local(&self, e: usize, v: usize) -> Option<usize> {
        self.mesh.element(e).nodes.iter().position(|&n| n == v)
    }

    /// Number of material groups.
    pub fn groups_count(&self) -> usize {
        self.group_names.len()
    }

    /// Name of material group `g`.
    pub fn group_name(&self, g: usize) -> &str {
        &self.group_names[g]
    }

    /// Material group index of element `e`.
    #[inline]
    pub fn group_of(&self, e: usize) -> usize {
        self.elem_group[e]
    }

    /// Elements of material group `g`.
    pub fn group_elements(&self, g: usize) -> &[usize] {
        &self.group_elements[g]
    }

    /// Physical coordinates and tangent lengths `|t|` at the quadrature
    /// nodes of a boundary edge.
    ///
    /// Edges are few compared to elements, so this is computed on the
    /// fly rather than cached.
    pub fn edge_quad_data(&self, edge: &BoundaryEdge) -> (Vec<Point2>, Vec<f64>) {
        let tables = edge.kind.tables();
        let mut coords = Vec::with_capacity(tables.qnodes_count());
        let mut tangents = Vec::with_capacity(tables.qnodes_count());
        for q in 0..tables.qnodes_count() {
            let mut coord = Point2::zeros();
            let mut tangent = Vec2::zeros();
            for (i, &node) in edge.nodes.iter().enumerate() {
                let point = self.mesh.node(node);
                coord += point * tables.qn(i, q);
                tangent += point * tables.qdn(i, q);
            }
            coords.push(coord);
            tangents.push(tangent.norm());
        }
        (coords, tangents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{EdgeKind, ElementKind};
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn unit_square_bilinear() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_node(Vector2::new(0.0, 0.0));
        mesh.add_node(Vector2::new(1.0, 0.0));
        mesh.add_node(Vector2::new(1.0, 1.0));
        mesh.add_node(Vector2::new(0.0, 1.0));
        mesh.add_element(ElementKind::Bilinear, vec![0, 1, 2, 3]).unwrap();
        mesh
    }

    #[test]
    fn test_jacobian_of_unit_square() {
        let proxy = MeshProxy::new(unit_square_bilinear()).unwrap();
        // Unit square mapped from [-1,1]²: det J = 1/4 everywhere
        for q in 0..proxy.qnodes_count(0) {
            assert_relative_eq!(proxy.jacobian(0, q), 0.25, epsilon = 1e-14);
        }
        // Area = Σ w detJ = 1
        let tables = proxy.tables(0);
        let area: f64 = (0..proxy.qnodes_count(0))
            .map(|q| tables.weight(q) * proxy.jacobian(0, q))
            .sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_inverted_element_is_rejected() {
        let mut mesh = Mesh::new();
        mesh.add_node(Vector2::new(0.0, 0.0));
        mesh.add_node(Vector2::new(1.0, 0.0));
        mesh.add_node(Vector2::new(1.0, 1.0));
        mesh.add_node(Vector2::new(0.0, 1.0));
        // Clockwise connectivity gives a negative determinant
        mesh.add_element(ElementKind::Bilinear, vec![0, 3, 2, 1]).unwrap();
        assert!(matches!(MeshProxy::new(mesh), Err(Error::Numerical(_))));
    }

    #[test]
    fn test_derivatives_of_linear_field() {
        // ∇(Σ N_i f_i) of f = 2x + 3y must be (2, 3) at every qnode
        let proxy = MeshProxy::new(unit_square_bilinear()).unwrap();
        let element = proxy.mesh().element(0).clone();
        for q in 0..proxy.qnodes_count(0) {
            let mut grad = Vec2::zeros();
            for (i, &node) in element.nodes.iter().enumerate() {
                let point = proxy.mesh().node(node);
                grad += proxy.derivatives(0, i, q) * (2.0 * point.x + 3.0 * point.y);
            }
            assert_relative_eq!(grad.x, 2.0, epsilon = 1e-13);
            assert_relative_eq!(grad.y, 3.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_node_elements_incidence() {
        let mut mesh = Mesh::new();
        for y in 0..2 {
            for x in 0..3 {
                mesh.add_node(Vector2::new(x as f64, y as f64));
            }
        }
        mesh.add_element(ElementKind::Bilinear, vec![0, 1, 4, 3]).unwrap();
        mesh.add_element(ElementKind::Bilinear, vec![1, 2, 5, 4]).unwrap();
        let proxy = MeshProxy::new(mesh).unwrap();
        assert_eq!(proxy.node_elements(0), &[0]);
        assert_eq!(proxy.node_elements(1), &[0, 1]);
        assert_eq!(proxy.node_elements(2), &[1]);
        assert_eq!(proxy.global_to_local(1, 1), Some(0));
        assert_eq!(proxy.global_to_local(0, 5), None);
    }

    #[test]
    fn test_implicit_default_group() {
        let proxy = MeshProxy::new(unit_square_bilinear()).unwrap();
        assert_eq!(proxy.groups_count(), 1);
        assert_eq!(proxy.group_name(0), "default");
        assert_eq!(proxy.group_of(0), 0);
    }

    #[test]
    fn test_ungrouped_element_is_rejected() {
        let mut mesh = unit_square_bilinear();
        mesh.add_node(Vector2::new(2.0, 0.0));
        mesh.add_node(Vector2::new(2.0, 1.0));
        mesh.add_element(ElementKind::Bilinear, vec![1, 4, 5, 2]).unwrap();
        mesh.add_group("Material1", vec![0]).unwrap();
        assert!(matches!(MeshProxy::new(mesh), Err(Error::Mesh(_))));
    }

    #[test]
    fn test_edge_quad_data() {
        let mut mesh = unit_square_bilinear();
        mesh.add_boundary_edge("Down", EdgeKind::Linear, vec![0, 1]).unwrap();
        let proxy = MeshProxy::new(mesh).unwrap();
        let edge = proxy.mesh().boundary("Down").unwrap()[0].clone();
        let (coords, tangents) = proxy.edge_quad_data(&edge);
        // Straight unit edge: |t| = 1/2 (half-length of [-1,1] mapping)
        for t in &tangents {
            assert_relative_eq!(*t, 0.5, epsilon = 1e-14);
        }
        // Quadrature points stay on the edge y = 0
        for c in &coords {
            assert_relative_eq!(c.y, 0.0, epsilon = 1e-14);
        }
    }
}
