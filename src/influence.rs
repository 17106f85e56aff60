//! Influence kernels for the nonlocal bilinear form.
//!
//! A kernel is a nonnegative radially decaying function of two points
//! with compact elliptical support of radii `(r₁, r₂)` and unit mass:
//! the integral of `κ(x, ·)` over the support equals 1. All kernels are
//! expressed in the normalized support coordinate
//! `t² = (Δx/r₁)² + (Δy/r₂)²` and vanish for `t > 1`; the normalization
//! constants are closed-form and computed at construction.

use crate::error::{Error, Result};
use crate::types::Point2;

/// Standard deviation of the normal-distribution kernel in support
/// coordinates: the support radius is three standard deviations.
const NORMAL_SIGMA: f64 = 1.0 / 3.0;

/// A compactly supported influence kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum Influence {
    /// `κ = C` on the support.
    Constant { radii: [f64; 2], norm: f64 },
    /// `κ = C (1 - tᵖ)^q` on the support.
    Polynomial {
        radii: [f64; 2],
        p: u32,
        q: u32,
        norm: f64,
    },
    /// `κ = C exp(-t² / (2σ²))` truncated at `t = 1`, σ = 1/3.
    NormalDistribution { radii: [f64; 2], norm: f64 },
}

fn check_radii(radii: [f64; 2]) -> Result<()> {
    if radii[0] <= 0.0 || radii[1] <= 0.0 {
        return Err(Error::Config(format!(
            "field \"nonlocal_radius\" must be positive, got [{}, {}]",
            radii[0], radii[1]
        )));
    }
    Ok(())
}

fn binomial(n: u32, k: u32) -> f64 {
    let mut value = 1.0;
    for i in 0..k {
        value = value * (n - i) as f64 / (i + 1) as f64;
    }
    value
}

impl Influence {
    /// Constant kernel with unit mass over the elliptical support.
    pub fn constant(radii: [f64; 2]) -> Result<Self> {
        check_radii(radii)?;
        let norm = 1.0 / (std::f64::consts::PI * radii[0] * radii[1]);
        Ok(Self::Constant { radii, norm })
    }

    /// Polynomial kernel `C (1 - tᵖ)^q` with unit mass.
    ///
    /// The mass over the support is
    /// `2π r₁ r₂ Σ_k C(q,k) (-1)^k / (pk + 2)`, which fixes `C`.
    pub fn polynomial(radii: [f64; 2], p: u32, q: u32) -> Result<Self> {
        check_radii(radii)?;
        if p == 0 {
            return Err(Error::Config(
                "field \"influence\": polynomial exponent p must be at least 1".to_owned(),
            ));
        }
        let radial: f64 = (0..=q)
            .map(|k| binomial(q, k) * (-1.0_f64).powi(k as i32) / (p * k + 2) as f64)
            .sum();
        let norm = 1.0 / (2.0 * std::f64::consts::PI * radii[0] * radii[1] * radial);
        Ok(Self::Polynomial { radii, p, q, norm })
    }

    /// Truncated Gaussian kernel with unit mass.
    pub fn normal_distribution(radii: [f64; 2]) -> Result<Self> {
        check_radii(radii)?;
        let s2 = NORMAL_SIGMA * NORMAL_SIGMA;
        let mass = 2.0
            * std::f64::consts::PI
            * radii[0]
            * radii[1]
            * s2
            * (1.0 - (-1.0 / (2.0 * s2)).exp());
        Ok(Self::NormalDistribution {
            radii,
            norm: 1.0 / mass,
        })
    }

    /// Support radii `(r₁, r₂)`.
    pub fn radii(&self) -> [f64; 2] {
        match *self {
            Self::Constant { radii, .. }
            | Self::Polynomial { radii, .. }
            | Self::NormalDistribution { radii, .. } => radii,
        }
    }

    /// Kernel value `κ(x, y)`; zero outside the support.
    pub fn value(&self, x: &Point2, y: &Point2) -> f64 {
        let radii = self.radii();
        let dx = (x.x - y.x) / radii[0];
        let dy = (x.y - y.y) / radii[1];
        let t2 = dx * dx + dy * dy;
        if t2 > 1.0 {
            return 0.0;
        }
        match *self {
            Self::Constant { norm, .. } => norm,
            Self::Polynomial { p, q, norm, .. } => {
                let tp = if p % 2 == 0 {
                    t2.powi((p / 2) as i32)
                } else {
                    t2.sqrt().powi(p as i32)
                };
                norm * (1.0 - tp).powi(q as i32)
            }
            Self::NormalDistribution { norm, .. } => {
                norm * (-t2 / (2.0 * NORMAL_SIGMA * NORMAL_SIGMA)).exp()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// ∫ κ(x, ·) over the support by composite Simpson in the radial
    /// support coordinate (the kernels are radial in t, so the angular
    /// integral is 2π r₁ r₂ ∫₀¹ κ̂(t) t dt).
    fn mass(kernel: &Influence) -> f64 {
        let radii = kernel.radii();
        let x = Point2::new(0.4, -0.2);
        let profile = |t: f64| {
            let y = Point2::new(x.x + t * radii[0], x.y);
            kernel.value(&x, &y) * t
        };
        let n = 2000;
        let h = 1.0 / n as f64;
        let mut sum = profile(0.0) + profile(1.0);
        for i in 1..n {
            let factor = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += factor * profile(i as f64 * h);
        }
        2.0 * std::f64::consts::PI * radii[0] * radii[1] * sum * h / 3.0
    }

    #[test]
    fn test_unit_mass() {
        let kernels = [
            Influence::constant([0.1, 0.1]).unwrap(),
            Influence::constant([0.3, 0.1]).unwrap(),
            Influence::polynomial([0.1, 0.1], 2, 1).unwrap(),
            Influence::polynomial([0.2, 0.5], 2, 1).unwrap(),
            Influence::polynomial([0.1, 0.1], 1, 2).unwrap(),
            Influence::polynomial([1.0, 1.0], 4, 3).unwrap(),
            Influence::normal_distribution([0.1, 0.1]).unwrap(),
            Influence::normal_distribution([2.0, 0.5]).unwrap(),
        ];
        for kernel in &kernels {
            assert_relative_eq!(mass(kernel), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_outside_support() {
        let kernel = Influence::polynomial([0.1, 0.1], 2, 1).unwrap();
        let x = Point2::new(0.0, 0.0);
        assert_eq!(kernel.value(&x, &Point2::new(0.11, 0.0)), 0.0);
        assert_eq!(kernel.value(&x, &Point2::new(0.08, 0.08)), 0.0);
        assert!(kernel.value(&x, &Point2::new(0.05, 0.05)) > 0.0);
    }

    #[test]
    fn test_polynomial_center_value() {
        // (1 - t²) kernel on a circular support: C = 2/(π r²)
        let r = 0.25;
        let kernel = Influence::polynomial([r, r], 2, 1).unwrap();
        let x = Point2::new(1.0, 2.0);
        let expected = 2.0 / (std::f64::consts::PI * r * r);
        assert_relative_eq!(kernel.value(&x, &x), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_is_symmetric_in_arguments() {
        let kernel = Influence::normal_distribution([0.4, 0.2]).unwrap();
        let x = Point2::new(0.1, 0.2);
        let y = Point2::new(0.3, 0.15);
        assert_relative_eq!(kernel.value(&x, &y), kernel.value(&y, &x), epsilon = 1e-15);
    }

    #[test]
    fn test_invalid_radius_is_config_error() {
        assert!(Influence::constant([0.0, 0.1]).is_err());
        assert!(Influence::polynomial([-1.0, 0.1], 2, 1).is_err());
        assert!(Influence::polynomial([0.1, 0.1], 0, 1).is_err());
    }
}
