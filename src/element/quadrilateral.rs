//! Quadrilateral reference bases on [-1, 1]².
//!
//! Nodes are numbered counterclockwise around the perimeter starting at
//! the bottom-left corner, so for the quadratic kinds the corners sit at
//! even indices and the mid-edge nodes at odd indices. The Lagrange
//! element appends its interior node last.

/// 4-node bilinear quadrilateral.
pub mod bilinear {
    pub const NODES: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

    pub fn n(i: usize, xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        0.25 * (1.0 + a * xi) * (1.0 + b * eta)
    }

    pub fn dn_dxi(i: usize, _xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        0.25 * a * (1.0 + b * eta)
    }

    pub fn dn_deta(i: usize, xi: f64, _eta: f64) -> f64 {
        let [a, b] = NODES[i];
        0.25 * b * (1.0 + a * xi)
    }
}

/// 8-node quadratic serendipity quadrilateral.
pub mod serendipity {
    pub const NODES: [[f64; 2]; 8] = [
        [-1.0, -1.0],
        [0.0, -1.0],
        [1.0, -1.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [-1.0, 1.0],
        [-1.0, 0.0],
    ];

    pub fn n(i: usize, xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        if a == 0.0 {
            0.5 * (1.0 - xi * xi) * (1.0 + b * eta)
        } else if b == 0.0 {
            0.5 * (1.0 + a * xi) * (1.0 - eta * eta)
        } else {
            0.25 * (1.0 + a * xi) * (1.0 + b * eta) * (a * xi + b * eta - 1.0)
        }
    }

    pub fn dn_dxi(i: usize, xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        if a == 0.0 {
            -xi * (1.0 + b * eta)
        } else if b == 0.0 {
            0.5 * a * (1.0 - eta * eta)
        } else {
            0.25 * a * (1.0 + b * eta) * (2.0 * a * xi + b * eta)
        }
    }

    pub fn dn_deta(i: usize, xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        if a == 0.0 {
            0.5 * b * (1.0 - xi * xi)
        } else if b == 0.0 {
            -eta * (1.0 + a * xi)
        } else {
            0.25 * b * (1.0 + a * xi) * (a * xi + 2.0 * b * eta)
        }
    }
}

/// 9-node biquadratic Lagrange quadrilateral.
pub mod lagrange {
    pub const NODES: [[f64; 2]; 9] = [
        [-1.0, -1.0],
        [0.0, -1.0],
        [1.0, -1.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [-1.0, 1.0],
        [-1.0, 0.0],
        [0.0, 0.0],
    ];

    // 1D quadratic Lagrange factor anchored at position -1, 0 or +1.
    fn l(pos: f64, t: f64) -> f64 {
        if pos < 0.0 {
            0.5 * t * (t - 1.0)
        } else if pos > 0.0 {
            0.5 * t * (t + 1.0)
        } else {
            1.0 - t * t
        }
    }

    fn dl(pos: f64, t: f64) -> f64 {
        if pos < 0.0 {
            t - 0.5
        } else if pos > 0.0 {
            t + 0.5
        } else {
            -2.0 * t
        }
    }

    pub fn n(i: usize, xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        l(a, xi) * l(b, eta)
    }

    pub fn dn_dxi(i: usize, xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        dl(a, xi) * l(b, eta)
    }

    pub fn dn_deta(i: usize, xi: f64, eta: f64) -> f64 {
        let [a, b] = NODES[i];
        l(a, xi) * dl(b, eta)
    }
}
