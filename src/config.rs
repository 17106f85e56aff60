//! Typed run configuration.
//!
//! These structs mirror the recognized configuration surface: per-group
//! material sections (`model` + `physical`), boundary conditions with
//! constant values, and the neighbor-search balancing mode. Parsing a
//! concrete file format is the embedder's job (everything here derives
//! serde); the `build` methods validate fail-fast, naming the offending
//! field, and produce the solver-facing types.

use crate::boundary::{constant_bc, ComponentBc, HeatBc, MechanicalBc};
use crate::error::{Error, Result};
use crate::influence::Influence;
use crate::material::{
    Conductivity, ElasticProperties, MaterialGroup, Materials, Model, ThermalProperties,
};
use crate::neighborhood::Balancing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A radius given as one scalar or one value per axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RadiusConfig {
    Scalar(f64),
    PerAxis([f64; 2]),
}

impl RadiusConfig {
    /// Per-axis radii.
    pub fn radii(&self) -> [f64; 2] {
        match *self {
            Self::Scalar(r) => [r, r],
            Self::PerAxis(r) => r,
        }
    }
}

/// Influence-kernel family and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceConfig {
    Polynomial2d { a: u32, b: u32 },
    NormalDistribution2d,
    Constant2d,
}

/// The `model` section of a material.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub influence: InfluenceConfig,
    pub local_weight: f64,
    pub nonlocal_radius: RadiusConfig,
    #[serde(default)]
    pub search_radius: Option<RadiusConfig>,
}

impl ModelConfig {
    /// Build the material model.
    pub fn build(&self) -> Result<Model> {
        let radii = self.nonlocal_radius.radii();
        let influence = match self.influence {
            InfluenceConfig::Polynomial2d { a, b } => Influence::polynomial(radii, a, b)?,
            InfluenceConfig::NormalDistribution2d => Influence::normal_distribution(radii)?,
            InfluenceConfig::Constant2d => Influence::constant(radii)?,
        };
        let model = Model::nonlocal(self.local_weight, influence)?;
        match self.search_radius {
            Some(radius) => model.with_search_radius(radius.radii()),
            None => Ok(model),
        }
    }
}

/// Conductivity given as a scalar, a diagonal, or a full tensor.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ConductivityConfig {
    Scalar(f64),
    Diagonal([f64; 2]),
    Tensor([[f64; 2]; 2]),
}

/// The `physical` section of a thermal material.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThermalPhysicalConfig {
    pub conductivity: ConductivityConfig,
}

/// The `physical` section of a mechanical material.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MechanicalPhysicalConfig {
    #[serde(rename = "E")]
    pub youngs_modulus: f64,
    pub nu: f64,
    #[serde(default)]
    pub thermal_expansion: f64,
}

/// One material section: optional `model` (local theory when absent)
/// plus the physics-specific `physical` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialConfig<P> {
    #[serde(default)]
    pub model: Option<ModelConfig>,
    pub physical: P,
}

fn build_model(model: &Option<ModelConfig>) -> Result<Model> {
    match model {
        Some(config) => config.build(),
        None => Ok(Model::local()),
    }
}

impl MaterialConfig<ThermalPhysicalConfig> {
    /// Build a thermal material group.
    pub fn build(&self) -> Result<MaterialGroup<ThermalProperties>> {
        let conductivity = match self.physical.conductivity {
            ConductivityConfig::Scalar(k) => Conductivity::Isotropic(k),
            ConductivityConfig::Diagonal(k) => Conductivity::Orthotropic(k),
            ConductivityConfig::Tensor(k) => Conductivity::Anisotropic(k),
        };
        Ok(MaterialGroup {
            physical: ThermalProperties::new(conductivity)?,
            model: build_model(&self.model)?,
        })
    }
}

impl MaterialConfig<MechanicalPhysicalConfig> {
    /// Build a mechanical material group.
    pub fn build(&self) -> Result<MaterialGroup<ElasticProperties>> {
        Ok(MaterialGroup {
            physical: ElasticProperties::new(
                self.physical.youngs_modulus,
                self.physical.nu,
            )?
            .with_thermal_expansion(self.physical.thermal_expansion),
            model: build_model(&self.model)?,
        })
    }
}

/// Build all thermal materials of a configuration.
pub fn build_thermal_materials(
    configs: &BTreeMap<String, MaterialConfig<ThermalPhysicalConfig>>,
) -> Result<Materials<ThermalProperties>> {
    configs
        .iter()
        .map(|(name, config)| {
            let group = config.build().map_err(|e| {
                Error::Config(format!("field \"materials.{}\": {}", name, e))
            })?;
            Ok((name.clone(), group))
        })
        .collect()
}

/// Build all mechanical materials of a configuration.
pub fn build_mechanical_materials(
    configs: &BTreeMap<String, MaterialConfig<MechanicalPhysicalConfig>>,
) -> Result<Materials<ElasticProperties>> {
    configs
        .iter()
        .map(|(name, config)| {
            let group = config.build().map_err(|e| {
                Error::Config(format!("field \"materials.{}\": {}", name, e))
            })?;
            Ok((name.clone(), group))
        })
        .collect()
}

/// A thermal boundary condition with a constant value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeatBcConfig {
    Temperature(f64),
    Flux(f64),
}

impl HeatBcConfig {
    /// Build the boundary condition.
    pub fn build(&self) -> HeatBc {
        match *self {
            Self::Temperature(value) => HeatBc::Temperature(constant_bc(value)),
            Self::Flux(value) => HeatBc::Flux(constant_bc(value)),
        }
    }
}

/// A mechanical boundary condition with constant component values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MechanicalBcConfig {
    Translation([f64; 2]),
    Force([f64; 2]),
}

impl MechanicalBcConfig {
    /// Build the boundary condition.
    pub fn build(&self) -> MechanicalBc {
        match *self {
            Self::Translation([x, y]) => MechanicalBc {
                x: ComponentBc::Translation(constant_bc(x)),
                y: ComponentBc::Translation(constant_bc(y)),
            },
            Self::Force([x, y]) => MechanicalBc {
                x: ComponentBc::Force(constant_bc(x)),
                y: ComponentBc::Force(constant_bc(y)),
            },
        }
    }
}

/// Neighbor-search balancing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalancingConfig {
    #[default]
    Speed,
    Memory,
    No,
}

impl From<BalancingConfig> for Balancing {
    fn from(config: BalancingConfig) -> Self {
        match config {
            BalancingConfig::Speed => Balancing::Speed,
            BalancingConfig::Memory => Balancing::Memory,
            BalancingConfig::No => Balancing::No,
        }
    }
}
