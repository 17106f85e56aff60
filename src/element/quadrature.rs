//! Gauss quadrature rules for numerical integration.
//!
//! Provides the rules the element catalog pairs with each reference
//! element kind:
//! - 1D Gauss-Legendre on [-1, 1] for boundary edges
//! - triangle rules on the unit triangle (0,0)-(1,0)-(0,1)
//! - tensor-product rules on [-1, 1]² for quadrilaterals

/// A quadrature point with reference coordinates and weight.
#[derive(Debug, Clone, Copy)]
pub struct QuadPoint {
    /// Reference coordinates (ξ, η). For 1D rules η is unused and zero.
    pub coords: [f64; 2],
    /// Integration weight.
    pub weight: f64,
}

impl QuadPoint {
    /// Create a new quadrature point.
    pub fn new(coords: [f64; 2], weight: f64) -> Self {
        Self { coords, weight }
    }

    /// Get ξ (first reference coordinate).
    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    /// Get η (second reference coordinate).
    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }
}

/// 1D Gauss-Legendre quadrature points and weights.
///
/// Returns (point, weight) pairs for integration on [-1, 1].
///
/// # Panics
///
/// Panics if `n` is not in 1..=4.
pub fn gauss_1d(n: usize) -> Vec<(f64, f64)> {
    match n {
        1 => vec![(0.0, 2.0)],
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            vec![(-p, 1.0), (p, 1.0)]
        }
        3 => {
            let p = (3.0 / 5.0_f64).sqrt();
            vec![(-p, 5.0 / 9.0), (0.0, 8.0 / 9.0), (p, 5.0 / 9.0)]
        }
        4 => {
            // Points: ±√((3 ∓ 2√(6/5))/7), weights (18 ± √30)/36
            let sqrt_6_5 = (6.0 / 5.0_f64).sqrt();
            let p1 = ((3.0 - 2.0 * sqrt_6_5) / 7.0).sqrt();
            let p2 = ((3.0 + 2.0 * sqrt_6_5) / 7.0).sqrt();
            let sqrt_30 = 30.0_f64.sqrt();
            let w1 = (18.0 + sqrt_30) / 36.0;
            let w2 = (18.0 - sqrt_30) / 36.0;
            vec![(-p2, w2), (-p1, w1), (p1, w1), (p2, w2)]
        }
        _ => panic!("gauss_1d: n must be 1, 2, 3, or 4, got {}", n),
    }
}

/// Triangle quadrature points on the unit triangle (0,0)-(1,0)-(0,1).
///
/// Coordinates are (ξ, η) with the third area coordinate implicit.
/// Weights are scaled for the unit triangle (area = 1/2).
///
/// # Integration order
///
/// - n=1: degree 1 (centroid)
/// - n=3: degree 2 (edge midpoints)
/// - n=6: degree 4 (two symmetric orbits)
///
/// # Panics
///
/// Panics if `n` is not 1, 3, or 6.
pub fn gauss_tri(n: usize) -> Vec<QuadPoint> {
    match n {
        1 => vec![QuadPoint::new([1.0 / 3.0, 1.0 / 3.0], 0.5)],
        3 => {
            let w = 1.0 / 6.0;
            vec![
                QuadPoint::new([0.5, 0.0], w),
                QuadPoint::new([0.5, 0.5], w),
                QuadPoint::new([0.0, 0.5], w),
            ]
        }
        6 => {
            // Two three-point orbits (a,a,b) and (c,c,d) in area coordinates.
            let a = 0.445_948_490_915_965;
            let b = 1.0 - 2.0 * a;
            let c = 0.091_576_213_509_771;
            let d = 1.0 - 2.0 * c;
            // Barycentric weights sum to 1; scale by the reference area 1/2.
            let wa = 0.223_381_589_678_011 / 2.0;
            let wc = 0.109_951_743_655_322 / 2.0;
            vec![
                QuadPoint::new([a, b], wa),
                QuadPoint::new([b, a], wa),
                QuadPoint::new([a, a], wa),
                QuadPoint::new([c, d], wc),
                QuadPoint::new([d, c], wc),
                QuadPoint::new([c, c], wc),
            ]
        }
        _ => panic!("gauss_tri: n must be 1, 3, or 6, got {}", n),
    }
}

/// Quadrilateral quadrature points on [-1, 1]².
///
/// Tensor product of 1D Gauss-Legendre rules, n² points total.
///
/// # Panics
///
/// Panics if `n` is not in 1..=4.
pub fn gauss_quad(n: usize) -> Vec<QuadPoint> {
    if !(1..=4).contains(&n) {
        panic!("gauss_quad: n must be in 1..=4, got {}", n);
    }

    let rule_1d = gauss_1d(n);
    let mut points = Vec::with_capacity(n * n);

    for &(xi, w_xi) in &rule_1d {
        for &(eta, w_eta) in &rule_1d {
            points.push(QuadPoint::new([xi, eta], w_xi * w_eta));
        }
    }

    points
}
