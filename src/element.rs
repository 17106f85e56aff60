//! Element catalog: reference bases, paired quadrature rules, and the
//! precomputed per-kind tables the assembler reads.
//!
//! Dispatch is a tagged enum plus constant function tables, so the hot
//! path never goes through a virtual call: each kind's basis values and
//! derivatives at its quadrature nodes are computed once and cached for
//! the lifetime of the process.
//!
//! # Submodules
//!
//! - [`quadrature`] - Gauss rules (1D, triangle, tensor-product quad)
//! - [`segment`] - 1D edge bases
//! - [`triangle`] - TRIANGLE, QUADRATIC_TRIANGLE
//! - [`quadrilateral`] - BILINEAR, QUADRATIC_SERENDIPITY, QUADRATIC_LAGRANGE
//! - [`cubic_serendipity`] - CUBIC_SERENDIPITY with shape parameter

pub mod cubic_serendipity;
pub mod quadrature;
pub mod quadrilateral;
pub mod segment;
pub mod triangle;

use crate::constants::CUBIC_SERENDIPITY_P;
use quadrature::{gauss_1d, gauss_quad, gauss_tri, QuadPoint};
use std::sync::OnceLock;

/// Supported 2D element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 3-node linear triangle.
    Triangle = 0,
    /// 6-node quadratic triangle.
    QuadraticTriangle = 1,
    /// 4-node bilinear quadrilateral.
    Bilinear = 2,
    /// 8-node quadratic serendipity quadrilateral.
    QuadraticSerendipity = 3,
    /// 9-node biquadratic Lagrange quadrilateral.
    QuadraticLagrange = 4,
    /// 12-node cubic serendipity quadrilateral.
    CubicSerendipity = 5,
}

/// Supported 1D boundary-edge kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// 2-node linear segment.
    Linear = 0,
    /// 3-node quadratic segment.
    Quadratic = 1,
}

fn cubic_n(i: usize, xi: f64, eta: f64) -> f64 {
    cubic_serendipity::n(i, xi, eta, CUBIC_SERENDIPITY_P)
}

fn cubic_dxi(i: usize, xi: f64, eta: f64) -> f64 {
    cubic_serendipity::dn_dxi(i, xi, eta, CUBIC_SERENDIPITY_P)
}

fn cubic_deta(i: usize, xi: f64, eta: f64) -> f64 {
    cubic_serendipity::dn_deta(i, xi, eta, CUBIC_SERENDIPITY_P)
}

/// One kind's reference basis as plain function pointers.
struct Basis {
    nodes: &'static [[f64; 2]],
    n: fn(usize, f64, f64) -> f64,
    dxi: fn(usize, f64, f64) -> f64,
    deta: fn(usize, f64, f64) -> f64,
}

impl ElementKind {
    /// All kinds, in tag order.
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Triangle,
        ElementKind::QuadraticTriangle,
        ElementKind::Bilinear,
        ElementKind::QuadraticSerendipity,
        ElementKind::QuadraticLagrange,
        ElementKind::CubicSerendipity,
    ];

    fn basis(self) -> Basis {
        match self {
            ElementKind::Triangle => Basis {
                nodes: &triangle::linear::NODES,
                n: triangle::linear::n,
                dxi: triangle::linear::dn_dxi,
                deta: triangle::linear::dn_deta,
            },
            ElementKind::QuadraticTriangle => Basis {
                nodes: &triangle::quadratic::NODES,
                n: triangle::quadratic::n,
                dxi: triangle::quadratic::dn_dxi,
                deta: triangle::quadratic::dn_deta,
            },
            ElementKind::Bilinear => Basis {
                nodes: &quadrilateral::bilinear::NODES,
                n: quadrilateral::bilinear::n,
                dxi: quadrilateral::bilinear::dn_dxi,
                deta: quadrilateral::bilinear::dn_deta,
            },
            ElementKind::QuadraticSerendipity => Basis {
                nodes: &quadrilateral::serendipity::NODES,
                n: quadrilateral::serendipity::n,
                dxi: quadrilateral::serendipity::dn_dxi,
                deta: quadrilateral::serendipity::dn_deta,
            },
            ElementKind::QuadraticLagrange => Basis {
                nodes: &quadrilateral::lagrange::NODES,
                n: quadrilateral::lagrange::n,
                dxi: quadrilateral::lagrange::dn_dxi,
                deta: quadrilateral::lagrange::dn_deta,
            },
            ElementKind::CubicSerendipity => Basis {
                nodes: &cubic_serendipity::NODES,
                n: cubic_n,
                dxi: cubic_dxi,
                deta: cubic_deta,
            },
        }
    }

    /// Number of nodes for this element kind.
    pub fn n_nodes(self) -> usize {
        self.basis().nodes.len()
    }

    /// Reference coordinates of the element's nodes.
    pub fn nodes(self) -> &'static [[f64; 2]] {
        self.basis().nodes
    }

    /// The Gauss rule paired with this kind.
    ///
    /// Rules are chosen to integrate the element's mass matrix exactly
    /// (the stiffness needs less), so the qnode-to-node projection is
    /// consistent for every kind.
    pub fn quadrature(self) -> Vec<QuadPoint> {
        match self {
            ElementKind::Triangle => gauss_tri(3),
            ElementKind::QuadraticTriangle => gauss_tri(6),
            ElementKind::Bilinear => gauss_quad(2),
            ElementKind::QuadraticSerendipity | ElementKind::QuadraticLagrange => gauss_quad(3),
            ElementKind::CubicSerendipity => gauss_quad(4),
        }
    }

    /// Basis value `N_i` at an arbitrary reference point.
    pub fn shape(self, i: usize, xi: f64, eta: f64) -> f64 {
        (self.basis().n)(i, xi, eta)
    }

    /// Basis derivative `∂N_i/∂ξ` at an arbitrary reference point.
    pub fn shape_dxi(self, i: usize, xi: f64, eta: f64) -> f64 {
        (self.basis().dxi)(i, xi, eta)
    }

    /// Basis derivative `∂N_i/∂η` at an arbitrary reference point.
    pub fn shape_deta(self, i: usize, xi: f64, eta: f64) -> f64 {
        (self.basis().deta)(i, xi, eta)
    }

    /// Precomputed basis and quadrature tables for this kind.
    pub fn tables(self) -> &'static ShapeTables {
        static TABLES: OnceLock<[ShapeTables; 6]> = OnceLock::new();
        &TABLES.get_or_init(|| ElementKind::ALL.map(ShapeTables::build))[self as usize]
    }
}

impl EdgeKind {
    /// All kinds, in tag order.
    pub const ALL: [EdgeKind; 2] = [EdgeKind::Linear, EdgeKind::Quadratic];

    /// Number of nodes for this edge kind.
    pub fn n_nodes(self) -> usize {
        match self {
            EdgeKind::Linear => 2,
            EdgeKind::Quadratic => 3,
        }
    }

    /// The 1D Gauss rule paired with this kind.
    pub fn quadrature(self) -> Vec<(f64, f64)> {
        match self {
            EdgeKind::Linear => gauss_1d(2),
            EdgeKind::Quadratic => gauss_1d(3),
        }
    }

    /// Basis value at an arbitrary reference point.
    pub fn shape(self, i: usize, xi: f64) -> f64 {
        match self {
            EdgeKind::Linear => segment::linear::n(i, xi),
            EdgeKind::Quadratic => segment::quadratic::n(i, xi),
        }
    }

    /// Basis derivative at an arbitrary reference point.
    pub fn shape_dn(self, i: usize, xi: f64) -> f64 {
        match self {
            EdgeKind::Linear => segment::linear::dn(i, xi),
            EdgeKind::Quadratic => segment::quadratic::dn(i, xi),
        }
    }

    /// Precomputed basis and quadrature tables for this kind.
    pub fn tables(self) -> &'static EdgeTables {
        static TABLES: OnceLock<[EdgeTables; 2]> = OnceLock::new();
        &TABLES.get_or_init(|| EdgeKind::ALL.map(EdgeTables::build))[self as usize]
    }
}

/// Basis values and derivatives of one 2D element kind, tabulated at its
/// quadrature nodes. Built once per kind, immutable afterwards.
pub struct ShapeTables {
    weights: Vec<f64>,
    coords: Vec<[f64; 2]>,
    n: Vec<Vec<f64>>,
    dxi: Vec<Vec<f64>>,
    deta: Vec<Vec<f64>>,
}

impl ShapeTables {
    fn build(kind: ElementKind) -> Self {
        let rule = kind.quadrature();
        let n_basis = kind.n_nodes();
        let mut tables = Self {
            weights: Vec::with_capacity(rule.len()),
            coords: Vec::with_capacity(rule.len()),
            n: Vec::with_capacity(rule.len()),
            dxi: Vec::with_capacity(rule.len()),
            deta: Vec::with_capacity(rule.len()),
        };
        for qp in &rule {
            let (xi, eta) = (qp.xi(), qp.eta());
            tables.weights.push(qp.weight);
            tables.coords.push(qp.coords);
            tables.n.push((0..n_basis).map(|i| kind.shape(i, xi, eta)).collect());
            tables
                .dxi
                .push((0..n_basis).map(|i| kind.shape_dxi(i, xi, eta)).collect());
            tables
                .deta
                .push((0..n_basis).map(|i| kind.shape_deta(i, xi, eta)).collect());
        }
        tables
    }

    /// Number of quadrature nodes.
    #[inline]
    pub fn qnodes_count(&self) -> usize {
        self.weights.len()
    }

    /// Quadrature weight of node `q`.
    #[inline]
    pub fn weight(&self, q: usize) -> f64 {
        self.weights[q]
    }

    /// Reference coordinates of quadrature node `q`.
    #[inline]
    pub fn qcoord(&self, q: usize) -> [f64; 2] {
        self.coords[q]
    }

    /// Basis value `N_i` at quadrature node `q`.
    #[inline]
    pub fn qn(&self, i: usize, q: usize) -> f64 {
        self.n[q][i]
    }

    /// Basis derivative `∂N_i/∂ξ` at quadrature node `q`.
    #[inline]
    pub fn qnxi(&self, i: usize, q: usize) -> f64 {
        self.dxi[q][i]
    }

    /// Basis derivative `∂N_i/∂η` at quadrature node `q`.
    #[inline]
    pub fn qneta(&self, i: usize, q: usize) -> f64 {
        self.deta[q][i]
    }
}

/// Basis values and derivatives of one edge kind at its quadrature nodes.
pub struct EdgeTables {
    weights: Vec<f64>,
    coords: Vec<f64>,
    n: Vec<Vec<f64>>,
    dn: Vec<Vec<f64>>,
}

impl EdgeTables {
    fn build(kind: EdgeKind) -> Self {
        let rule = kind.quadrature();
        let n_basis = kind.n_nodes();
        let mut tables = Self {
            weights: Vec::with_capacity(rule.len()),
            coords: Vec::with_capacity(rule.len()),
            n: Vec::with_capacity(rule.len()),
            dn: Vec::with_capacity(rule.len()),
        };
        for &(xi, w) in &rule {
            tables.weights.push(w);
            tables.coords.push(xi);
            tables.n.push((0..n_basis).map(|i| kind.shape(i, xi)).collect());
            tables
                .dn
                .push((0..n_basis).map(|i| kind.shape_dn(i, xi)).collect());
        }
        tables
    }

    /// Number of quadrature nodes.
    #[inline]
    pub fn qnodes_count(&self) -> usize {
        self.weights.len()
    }

    /// Quadrature weight of node `q`.
    #[inline]
    pub fn weight(&self, q: usize) -> f64 {
        self.weights[q]
    }

    /// Reference coordinate of quadrature node `q`.
    #[inline]
    pub fn qcoord(&self, q: usize) -> f64 {
        self.coords[q]
    }

    /// Basis value `N_i` at quadrature node `q`.
    #[inline]
    pub fn qn(&self, i: usize, q: usize) -> f64 {
        self.n[q][i]
    }

    /// Basis derivative `dN_i/dξ` at quadrature node `q`.
    #[inline]
    pub fn qdn(&self, i: usize, q: usize) -> f64 {
        self.dn[q][i]
    }
}
