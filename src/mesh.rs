//! Mesh container: nodal coordinates, element connectivity, named
//! boundary-edge groups, and named material groups.
//!
//! The container is plain data; all derived geometry (Jacobians,
//! incidence, quadrature coordinates) lives in [`crate::proxy::MeshProxy`].

use crate::element::{EdgeKind, ElementKind};
use crate::error::{Error, Result};
use crate::types::Point2;

/// Element connectivity - node indices for a 2D element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementConnectivity {
    /// Element kind, selecting the basis and quadrature family.
    pub kind: ElementKind,
    /// Node indices (0-based), in the kind's reference ordering.
    pub nodes: Vec<usize>,
}

/// A boundary edge: a 1D element on the mesh boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryEdge {
    /// Edge kind, selecting the 1D basis and quadrature rule.
    pub kind: EdgeKind,
    /// Node indices in order along the edge.
    pub nodes: Vec<usize>,
}

/// Unstructured 2D mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    nodes: Vec<Point2>,
    elements: Vec<ElementConnectivity>,
    boundaries: Vec<(String, Vec<BoundaryEdge>)>,
    groups: Vec<(String, Vec<usize>)>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(n_nodes: usize, n_elements: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n_nodes),
            elements: Vec::with_capacity(n_elements),
            boundaries: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Add a node to the mesh, returning its index.
    pub fn add_node(&mut self, point: Point2) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(point);
        idx
    }

    /// Add multiple nodes at once.
    pub fn add_nodes(&mut self, points: impl IntoIterator<Item = Point2>) {
        self.nodes.extend(points);
    }

    fn check_nodes(&self, nodes: &[usize], expected: usize, what: &str) -> Result<()> {
        if nodes.len() != expected {
            return Err(Error::Mesh(format!(
                "{} requires {} nodes, got {}",
                what,
                expected,
                nodes.len()
            )));
        }
        for &node in nodes {
            if node >= self.nodes.len() {
                return Err(Error::Mesh(format!(
                    "node index {} out of bounds (mesh has {} nodes)",
                    node,
                    self.nodes.len()
                )));
            }
        }
        Ok(())
    }

    /// Add a 2D element, returning its index.
    pub fn add_element(&mut self, kind: ElementKind, nodes: Vec<usize>) -> Result<usize> {
        self.check_nodes(&nodes, kind.n_nodes(), &format!("element kind {:?}", kind))?;
        let idx = self.elements.len();
        self.elements.push(ElementConnectivity { kind, nodes });
        Ok(idx)
    }

    /// Append an edge to the named boundary group, creating the group if
    /// it does not exist yet.
    pub fn add_boundary_edge(
        &mut self,
        name: &str,
        kind: EdgeKind,
        nodes: Vec<usize>,
    ) -> Result<()> {
        self.check_nodes(&nodes, kind.n_nodes(), &format!("boundary edge kind {:?}", kind))?;
        let edge = BoundaryEdge { kind, nodes };
        match self.boundaries.iter_mut().find(|(n, _)| n == name) {
            Some((_, edges)) => edges.push(edge),
            None => self.boundaries.push((name.to_owned(), vec![edge])),
        }
        Ok(())
    }

    /// Assign elements to the named material group.
    ///
    /// An element may belong to at most one group.
    pub fn add_group(&mut self, name: &str, elements: Vec<usize>) -> Result<()> {
        for &e in &elements {
            if e >= self.elements.len() {
                return Err(Error::Mesh(format!(
                    "element index {} out of bounds (mesh has {} elements)",
                    e,
                    self.elements.len()
                )));
            }
            for (other, members) in &self.groups {
                if members.contains(&e) {
                    return Err(Error::Mesh(format!(
                        "element {} already belongs to material group \"{}\"",
                        e, other
                    )));
                }
            }
        }
        match self.groups.iter_mut().find(|(n, _)| n == name) {
            Some((_, members)) => members.extend(elements),
            None => self.groups.push((name.to_owned(), elements)),
        }
        Ok(())
    }

    /// Number of nodes in the mesh.
    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of 2D elements in the mesh.
    pub fn elements_count(&self) -> usize {
        self.elements.len()
    }

    /// Nodal coordinates.
    pub fn nodes(&self) -> &[Point2] {
        &self.nodes
    }

    /// Coordinates of a specific node.
    pub fn node(&self, idx: usize) -> Point2 {
        self.nodes[idx]
    }

    /// Element connectivity list.
    pub fn elements(&self) -> &[ElementConnectivity] {
        &self.elements
    }

    /// A specific element's connectivity.
    pub fn element(&self, idx: usize) -> &ElementConnectivity {
        &self.elements[idx]
    }

    /// Named boundary groups, in insertion order.
    pub fn boundaries(&self) -> &[(String, Vec<BoundaryEdge>)] {
        &self.boundaries
    }

    /// The edges of a named boundary group.
    pub fn boundary(&self, name: &str) -> Option<&[BoundaryEdge]> {
        self.boundaries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, edges)| edges.as_slice())
    }

    /// Named material groups, in insertion order.
    pub fn groups(&self) -> &[(String, Vec<usize>)] {
        &self.groups
    }

    /// Renumber nodes: node `v` becomes node `perm[v]`.
    ///
    /// Used to apply a bandwidth-reducing permutation before assembly.
    /// Coordinates, element connectivity, and boundary edges are all
    /// rewritten consistently.
    pub fn renumber(&mut self, perm: &[usize]) -> Result<()> {
        if perm.len() != self.nodes.len() {
            return Err(Error::Mesh(format!(
                "permutation length {} does not match node count {}",
                perm.len(),
                self.nodes.len()
            )));
        }
        let mut seen = vec![false; perm.len()];
        for &p in perm {
            if p >= perm.len() || seen[p] {
                return Err(Error::Mesh("invalid node permutation".to_owned()));
            }
            seen[p] = true;
        }

        let mut nodes = vec![Point2::zeros(); self.nodes.len()];
        for (old, &new) in perm.iter().enumerate() {
            nodes[new] = self.nodes[old];
        }
        self.nodes = nodes;

        for element in &mut self.elements {
            for node in &mut element.nodes {
                *node = perm[*node];
            }
        }
        for (_, edges) in &mut self.boundaries {
            for edge in edges {
                for node in &mut edge.nodes {
                    *node = perm[*node];
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn unit_triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_node(Vector2::new(0.0, 0.0));
        mesh.add_node(Vector2::new(1.0, 0.0));
        mesh.add_node(Vector2::new(0.0, 1.0));
        mesh.add_element(ElementKind::Triangle, vec![0, 1, 2]).unwrap();
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_triangle_mesh();
        assert_eq!(mesh.nodes_count(), 3);
        assert_eq!(mesh.elements_count(), 1);
    }

    #[test]
    fn test_invalid_element_node_count() {
        let mut mesh = Mesh::new();
        mesh.add_node(Vector2::new(0.0, 0.0));
        mesh.add_node(Vector2::new(1.0, 0.0));
        // Triangle needs 3 nodes
        assert!(mesh.add_element(ElementKind::Triangle, vec![0, 1]).is_err());
    }

    #[test]
    fn test_invalid_node_index() {
        let mut mesh = Mesh::new();
        mesh.add_node(Vector2::new(0.0, 0.0));
        assert!(mesh.add_element(ElementKind::Triangle, vec![0, 1, 2]).is_err());
    }

    #[test]
    fn test_boundary_groups() {
        let mut mesh = unit_triangle_mesh();
        mesh.add_boundary_edge("Left", EdgeKind::Linear, vec![0, 2]).unwrap();
        mesh.add_boundary_edge("Left", EdgeKind::Linear, vec![2, 1]).unwrap();
        assert_eq!(mesh.boundary("Left").unwrap().len(), 2);
        assert!(mesh.boundary("Right").is_none());
    }

    #[test]
    fn test_group_exclusivity() {
        let mut mesh = unit_triangle_mesh();
        mesh.add_group("Material1", vec![0]).unwrap();
        assert!(mesh.add_group("Material2", vec![0]).is_err());
    }

    #[test]
    fn test_renumber() {
        let mut mesh = unit_triangle_mesh();
        mesh.add_boundary_edge("Down", EdgeKind::Linear, vec![0, 1]).unwrap();
        // Swap nodes 0 and 2
        mesh.renumber(&[2, 1, 0]).unwrap();
        assert_eq!(mesh.node(2), Vector2::new(0.0, 0.0));
        assert_eq!(mesh.element(0).nodes, vec![2, 1, 0]);
        assert_eq!(mesh.boundary("Down").unwrap()[0].nodes, vec![2, 1]);
    }

    #[test]
    fn test_renumber_rejects_non_permutation() {
        let mut mesh = unit_triangle_mesh();
        assert!(mesh.renumber(&[0, 0, 1]).is_err());
        assert!(mesh.renumber(&[0, 1]).is_err());
    }
}
