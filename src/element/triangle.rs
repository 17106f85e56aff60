//! Triangle reference bases on the unit triangle (0,0)-(1,0)-(0,1).

/// 3-node linear triangle. Nodes: the three corners.
pub mod linear {
    pub const NODES: [[f64; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

    pub fn n(i: usize, xi: f64, eta: f64) -> f64 {
        match i {
            0 => 1.0 - xi - eta,
            1 => xi,
            2 => eta,
            _ => panic!("triangle has 3 basis functions, got index {}", i),
        }
    }

    pub fn dn_dxi(i: usize, _xi: f64, _eta: f64) -> f64 {
        match i {
            0 => -1.0,
            1 => 1.0,
            2 => 0.0,
            _ => panic!("triangle has 3 basis functions, got index {}", i),
        }
    }

    pub fn dn_deta(i: usize, _xi: f64, _eta: f64) -> f64 {
        match i {
            0 => -1.0,
            1 => 0.0,
            2 => 1.0,
            _ => panic!("triangle has 3 basis functions, got index {}", i),
        }
    }
}

/// 6-node quadratic triangle. Nodes: corners 0..2, then mid-edge nodes
/// 3 (edge 0-1), 4 (edge 1-2), 5 (edge 2-0).
pub mod quadratic {
    pub const NODES: [[f64; 2]; 6] = [
        [0.0, 0.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [0.5, 0.0],
        [0.5, 0.5],
        [0.0, 0.5],
    ];

    pub fn n(i: usize, xi: f64, eta: f64) -> f64 {
        let l0 = 1.0 - xi - eta;
        match i {
            0 => l0 * (2.0 * l0 - 1.0),
            1 => xi * (2.0 * xi - 1.0),
            2 => eta * (2.0 * eta - 1.0),
            3 => 4.0 * l0 * xi,
            4 => 4.0 * xi * eta,
            5 => 4.0 * eta * l0,
            _ => panic!("quadratic triangle has 6 basis functions, got index {}", i),
        }
    }

    pub fn dn_dxi(i: usize, xi: f64, eta: f64) -> f64 {
        let l0 = 1.0 - xi - eta;
        match i {
            0 => 1.0 - 4.0 * l0,
            1 => 4.0 * xi - 1.0,
            2 => 0.0,
            3 => 4.0 * (l0 - xi),
            4 => 4.0 * eta,
            5 => -4.0 * eta,
            _ => panic!("quadratic triangle has 6 basis functions, got index {}", i),
        }
    }

    pub fn dn_deta(i: usize, xi: f64, eta: f64) -> f64 {
        let l0 = 1.0 - xi - eta;
        match i {
            0 => 1.0 - 4.0 * l0,
            1 => 0.0,
            2 => 4.0 * eta - 1.0,
            3 => -4.0 * xi,
            4 => 4.0 * xi,
            5 => 4.0 * (l0 - eta),
            _ => panic!("quadratic triangle has 6 basis functions, got index {}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_kronecker_delta() {
        for (i, &[xi, eta]) in quadratic::NODES.iter().enumerate() {
            for j in 0..6 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(quadratic::n(j, xi, eta), expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_quadratic_partition_of_unity() {
        for &(xi, eta) in &[(0.2, 0.3), (0.0, 0.0), (0.5, 0.5), (1.0 / 3.0, 1.0 / 3.0)] {
            let sum: f64 = (0..6).map(|i| quadratic::n(i, xi, eta)).sum();
            let dsum_xi: f64 = (0..6).map(|i| quadratic::dn_dxi(i, xi, eta)).sum();
            let dsum_eta: f64 = (0..6).map(|i| quadratic::dn_deta(i, xi, eta)).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-14);
            assert_relative_eq!(dsum_xi, 0.0, epsilon = 1e-14);
            assert_relative_eq!(dsum_eta, 0.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_quadratic_reproduces_linear_field() {
        // Σ N_i f(x_i) = f(x) for linear f on the reference triangle
        let f = |x: f64, y: f64| 2.0 * x - 3.0 * y + 0.5;
        for &(xi, eta) in &[(0.1, 0.2), (0.4, 0.3)] {
            let interp: f64 = (0..6)
                .map(|i| {
                    let [xn, yn] = quadratic::NODES[i];
                    quadratic::n(i, xi, eta) * f(xn, yn)
                })
                .sum();
            assert_relative_eq!(interp, f(xi, eta), epsilon = 1e-14);
        }
    }
}
