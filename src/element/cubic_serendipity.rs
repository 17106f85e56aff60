//! 12-node cubic serendipity quadrilateral on [-1, 1]².
//!
//! The basis carries a shape parameter `p`: cubic serendipity bases go
//! negative at corner nodes, and `p` (the integral of a corner function
//! over the element) shifts mass between corner and edge functions to
//! control that. `p = -1/2` recovers the classical 12-node element.
//!
//! Node numbering, counterclockwise from the bottom-left corner:
//!
//! ```text
//!  9---8---7---6
//!  |           |
//!  10          5
//!  |           |
//!  11          4
//!  |           |
//!  0---1---2---3
//! ```

pub const NODES: [[f64; 2]; 12] = [
    [-1.0, -1.0],
    [-1.0 / 3.0, -1.0],
    [1.0 / 3.0, -1.0],
    [1.0, -1.0],
    [1.0, -1.0 / 3.0],
    [1.0, 1.0 / 3.0],
    [1.0, 1.0],
    [1.0 / 3.0, 1.0],
    [-1.0 / 3.0, 1.0],
    [-1.0, 1.0],
    [-1.0, 1.0 / 3.0],
    [-1.0, -1.0 / 3.0],
];

// Corner functions (a, b = ±1):
//   N = 1/32 (1 + aξ)(1 + bη)[9(ξ² + η²) + (18p+9)(abξη - aξ - bη) + 18p - 1]
// Edge functions on η = ±1 (a = ±1/3, b = ±1):
//   N = 9/64 (1 - ξ²)(1 + bη)[18aξ + (2p+1)bη + 1 - 2p]
// Edge functions on ξ = ±1 (a = ±1, b = ±1/3):
//   N = 9/64 (1 - η²)(1 + aξ)[18bη + (2p+1)aξ + 1 - 2p]

pub fn n(i: usize, xi: f64, eta: f64, p: f64) -> f64 {
    let [a, b] = NODES[i];
    if a.abs() == 1.0 && b.abs() == 1.0 {
        let g = 9.0 * (xi * xi + eta * eta)
            + (18.0 * p + 9.0) * (a * b * xi * eta - a * xi - b * eta)
            + 18.0 * p
            - 1.0;
        (1.0 + a * xi) * (1.0 + b * eta) * g / 32.0
    } else if b.abs() == 1.0 {
        let h = 18.0 * a * xi + (2.0 * p + 1.0) * b * eta + 1.0 - 2.0 * p;
        9.0 / 64.0 * (1.0 - xi * xi) * (1.0 + b * eta) * h
    } else {
        let h = 18.0 * b * eta + (2.0 * p + 1.0) * a * xi + 1.0 - 2.0 * p;
        9.0 / 64.0 * (1.0 - eta * eta) * (1.0 + a * xi) * h
    }
}

pub fn dn_dxi(i: usize, xi: f64, eta: f64, p: f64) -> f64 {
    let [a, b] = NODES[i];
    if a.abs() == 1.0 && b.abs() == 1.0 {
        let c = 18.0 * p + 9.0;
        let g = 9.0 * (xi * xi + eta * eta) + c * (a * b * xi * eta - a * xi - b * eta)
            + 18.0 * p
            - 1.0;
        (1.0 + b * eta) * (a * g + (1.0 + a * xi) * (18.0 * xi + c * (a * b * eta - a))) / 32.0
    } else if b.abs() == 1.0 {
        let h = 18.0 * a * xi + (2.0 * p + 1.0) * b * eta + 1.0 - 2.0 * p;
        9.0 / 64.0 * (1.0 + b * eta) * (-2.0 * xi * h + 18.0 * a * (1.0 - xi * xi))
    } else {
        let h = 18.0 * b * eta + (2.0 * p + 1.0) * a * xi + 1.0 - 2.0 * p;
        9.0 / 64.0 * (1.0 - eta * eta) * (a * h + (1.0 + a * xi) * (2.0 * p + 1.0) * a)
    }
}

pub fn dn_deta(i: usize, xi: f64, eta: f64, p: f64) -> f64 {
    let [a, b] = NODES[i];
    if a.abs() == 1.0 && b.abs() == 1.0 {
        let c = 18.0 * p + 9.0;
        let g = 9.0 * (xi * xi + eta * eta) + c * (a * b * xi * eta - a * xi - b * eta)
            + 18.0 * p
            - 1.0;
        (1.0 + a * xi) * (b * g + (1.0 + b * eta) * (18.0 * eta + c * (a * b * xi - b))) / 32.0
    } else if b.abs() == 1.0 {
        let h = 18.0 * a * xi + (2.0 * p + 1.0) * b * eta + 1.0 - 2.0 * p;
        9.0 / 64.0 * (1.0 - xi * xi) * (b * h + (1.0 + b * eta) * (2.0 * p + 1.0) * b)
    } else {
        let h = 18.0 * b * eta + (2.0 * p + 1.0) * a * xi + 1.0 - 2.0 * p;
        9.0 / 64.0 * (1.0 + a * xi) * (-2.0 * eta * h + 18.0 * b * (1.0 - eta * eta))
    }
}
