//! 1D reference bases for boundary edges, on ξ ∈ [-1, 1].
//!
//! Nodes are ordered along the edge: for the quadratic segment the
//! mid-edge node sits between the two ends.

pub mod linear {
    pub const NODES: [f64; 2] = [-1.0, 1.0];

    pub fn n(i: usize, xi: f64) -> f64 {
        match i {
            0 => 0.5 * (1.0 - xi),
            1 => 0.5 * (1.0 + xi),
            _ => panic!("linear segment has 2 basis functions, got index {}", i),
        }
    }

    pub fn dn(i: usize, _xi: f64) -> f64 {
        match i {
            0 => -0.5,
            1 => 0.5,
            _ => panic!("linear segment has 2 basis functions, got index {}", i),
        }
    }
}

pub mod quadratic {
    pub const NODES: [f64; 3] = [-1.0, 0.0, 1.0];

    pub fn n(i: usize, xi: f64) -> f64 {
        match i {
            0 => 0.5 * xi * (xi - 1.0),
            1 => 1.0 - xi * xi,
            2 => 0.5 * xi * (xi + 1.0),
            _ => panic!("quadratic segment has 3 basis functions, got index {}", i),
        }
    }

    pub fn dn(i: usize, xi: f64) -> f64 {
        match i {
            0 => xi - 0.5,
            1 => -2.0 * xi,
            2 => xi + 0.5,
            _ => panic!("quadratic segment has 3 basis functions, got index {}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_kronecker_delta() {
        for (i, &xi_i) in linear::NODES.iter().enumerate() {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(linear::n(j, xi_i), expected, epsilon = 1e-14);
            }
        }
        for (i, &xi_i) in quadratic::NODES.iter().enumerate() {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(quadratic::n(j, xi_i), expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_segment_partition_of_unity() {
        for &xi in &[-1.0, -0.3, 0.0, 0.7, 1.0] {
            let sum_lin: f64 = (0..2).map(|i| linear::n(i, xi)).sum();
            let sum_quad: f64 = (0..3).map(|i| quadratic::n(i, xi)).sum();
            assert_relative_eq!(sum_lin, 1.0, epsilon = 1e-14);
            assert_relative_eq!(sum_quad, 1.0, epsilon = 1e-14);

            let dsum_quad: f64 = (0..3).map(|i| quadratic::dn(i, xi)).sum();
            assert_relative_eq!(dsum_quad, 0.0, epsilon = 1e-14);
        }
    }
}
