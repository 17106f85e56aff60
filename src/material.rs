//! Physical parameters and the nonlocal model, per material group.
//!
//! A material group couples a physical parameter set (conductivity for
//! the thermal problem, elastic constants for mechanics) with a
//! [`Model`] choosing between the local and nonlocal theory.

use crate::constants::MAX_NONLOCAL_WEIGHT;
use crate::error::{Error, Result};
use crate::influence::Influence;
use crate::proxy::MeshProxy;
use nalgebra::Matrix2;
use std::collections::BTreeMap;

/// Which assembly passes run for a material group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theory {
    Local,
    Nonlocal,
}

/// Nonlocal part of a material model: the influence kernel and the
/// neighbor-search radius (which may exceed the kernel support).
#[derive(Debug, Clone, PartialEq)]
pub struct NonlocalPart {
    pub influence: Influence,
    pub search_radius: [f64; 2],
}

/// Local/nonlocal mixing model of a material group.
///
/// The assembled bilinear form is `p1·local + (1-p1)·nonlocal` with the
/// local weight `p1 ∈ [0, 1]`. Weights at or above
/// [`MAX_NONLOCAL_WEIGHT`] select the pure local theory and skip the
/// nonlocal pass entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    local_weight: f64,
    nonlocal: Option<NonlocalPart>,
}

impl Model {
    /// Pure local model (`p1 = 1`).
    pub fn local() -> Self {
        Self {
            local_weight: 1.0,
            nonlocal: None,
        }
    }

    /// Mixed model with the given local weight and influence kernel.
    ///
    /// The search radius defaults to the kernel support radii.
    pub fn nonlocal(local_weight: f64, influence: Influence) -> Result<Self> {
        if !(0.0..=1.0).contains(&local_weight) {
            return Err(Error::Config(format!(
                "field \"local_weight\" must be in [0, 1], got {}",
                local_weight
            )));
        }
        let search_radius = influence.radii();
        Ok(Self {
            local_weight,
            nonlocal: Some(NonlocalPart {
                influence,
                search_radius,
            }),
        })
    }

    /// Override the neighbor-search radius.
    ///
    /// The search radius must cover the kernel support on both axes.
    pub fn with_search_radius(mut self, search_radius: [f64; 2]) -> Result<Self> {
        match &mut self.nonlocal {
            Some(part) => {
                let radii = part.influence.radii();
                if search_radius[0] < radii[0] || search_radius[1] < radii[1] {
                    return Err(Error::Config(format!(
                        "field \"search_radius\" [{}, {}] is smaller than \"nonlocal_radius\" [{}, {}]",
                        search_radius[0], search_radius[1], radii[0], radii[1]
                    )));
                }
                part.search_radius = search_radius;
                Ok(self)
            }
            None => Err(Error::Config(
                "field \"search_radius\" given for a purely local model".to_owned(),
            )),
        }
    }

    /// The mixing factor `p1`.
    #[inline]
    pub fn local_weight(&self) -> f64 {
        self.local_weight
    }

    /// The nonlocal factor `1 - p1`.
    #[inline]
    pub fn nonlocal_weight(&self) -> f64 {
        1.0 - self.local_weight
    }

    /// Which theory the assembler runs for this model.
    pub fn theory(&self) -> Theory {
        if self.local_weight < MAX_NONLOCAL_WEIGHT && self.nonlocal.is_some() {
            Theory::Nonlocal
        } else {
            Theory::Local
        }
    }

    /// The influence kernel, if the model has a nonlocal part.
    pub fn influence(&self) -> Option<&Influence> {
        self.nonlocal.as_ref().map(|part| &part.influence)
    }

    /// The neighbor-search radius, if the model has a nonlocal part.
    pub fn search_radius(&self) -> Option<[f64; 2]> {
        self.nonlocal.as_ref().map(|part| part.search_radius)
    }
}

/// Thermal conductivity of a material group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conductivity {
    /// Scalar conductivity `k`.
    Isotropic(f64),
    /// Diagonal tensor `diag(k₁, k₂)`.
    Orthotropic([f64; 2]),
    /// Full symmetric 2×2 tensor, row-major.
    Anisotropic([[f64; 2]; 2]),
}

impl Conductivity {
    /// The conductivity as a 2×2 tensor.
    pub fn tensor(&self) -> Matrix2<f64> {
        match *self {
            Self::Isotropic(k) => Matrix2::new(k, 0.0, 0.0, k),
            Self::Orthotropic([kx, ky]) => Matrix2::new(kx, 0.0, 0.0, ky),
            Self::Anisotropic(k) => Matrix2::new(k[0][0], k[0][1], k[1][0], k[1][1]),
        }
    }

    fn validate(&self) -> Result<()> {
        let k = self.tensor();
        let spd = k[(0, 0)] > 0.0
            && k[(1, 1)] > 0.0
            && k[(0, 1)] == k[(1, 0)]
            && k.determinant() > 0.0;
        if !spd {
            return Err(Error::Config(format!(
                "field \"conductivity\" must be a symmetric positive-definite tensor, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Physical parameters of the thermal problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalProperties {
    pub conductivity: Conductivity,
}

impl ThermalProperties {
    /// Create validated thermal properties.
    pub fn new(conductivity: Conductivity) -> Result<Self> {
        conductivity.validate()?;
        Ok(Self { conductivity })
    }
}

/// Physical parameters of the plane-stress mechanical problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticProperties {
    /// Young's modulus E.
    pub youngs_modulus: f64,
    /// Poisson's ratio ν.
    pub poissons_ratio: f64,
    /// Linear thermal-expansion coefficient α (zero if unused).
    pub thermal_expansion: f64,
}

impl ElasticProperties {
    /// Create validated elastic properties.
    pub fn new(youngs_modulus: f64, poissons_ratio: f64) -> Result<Self> {
        if youngs_modulus <= 0.0 {
            return Err(Error::Config(format!(
                "field \"E\" must be positive, got {}",
                youngs_modulus
            )));
        }
        if poissons_ratio <= -1.0 || poissons_ratio >= 0.5 {
            return Err(Error::Config(format!(
                "field \"nu\" must be in (-1, 0.5), got {}",
                poissons_ratio
            )));
        }
        Ok(Self {
            youngs_modulus,
            poissons_ratio,
            thermal_expansion: 0.0,
        })
    }

    /// Set the thermal-expansion coefficient.
    pub fn with_thermal_expansion(mut self, alpha: f64) -> Self {
        self.thermal_expansion = alpha;
        self
    }

    /// Plane-stress constitutive coefficients
    /// `[E/(1-ν²), νE/(1-ν²), E/(2(1+ν))]`.
    pub fn coeffs(&self) -> [f64; 3] {
        let e = self.youngs_modulus;
        let nu = self.poissons_ratio;
        [
            e / (1.0 - nu * nu),
            nu * e / (1.0 - nu * nu),
            0.5 * e / (1.0 + nu),
        ]
    }
}

/// A material group: physical parameters plus the nonlocal model.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGroup<P> {
    pub physical: P,
    pub model: Model,
}

/// Materials keyed by mesh group name.
pub type Materials<P> = BTreeMap<String, MaterialGroup<P>>;

/// Resolve materials to the proxy's group indices.
///
/// Fails fast if a mesh group has no material assigned.
pub(crate) fn resolve<'a, P>(
    proxy: &MeshProxy,
    materials: &'a Materials<P>,
) -> Result<Vec<&'a MaterialGroup<P>>> {
    (0..proxy.groups_count())
        .map(|g| {
            let name = proxy.group_name(g);
            materials.get(name).ok_or_else(|| {
                Error::Config(format!(
                    "field \"materials\" has no entry for mesh group \"{}\"",
                    name
                ))
            })
        })
        .collect()
}
