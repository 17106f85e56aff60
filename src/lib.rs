//! nlfem - 2D nonlocal finite element solver core.
//!
//! Stationary scalar (heat conduction) and vector (plane-stress
//! elasticity) boundary-value problems on unstructured meshes, where
//! each material group mixes the classical local stiffness with a
//! nonlocal integral term: every element interacts with a neighborhood
//! of elements weighted by a compactly supported influence kernel, and
//! the assembled entry is `p1·local + (1-p1)·nonlocal`.
//!
//! # Architecture
//!
//! - [`Mesh`]: nodal coordinates, connectivity, boundary and material
//!   groups; [`MeshProxy`] derives the immutable geometry cache.
//! - [`element`]: reference bases and quadrature tables, dispatched over
//!   an element-kind tag.
//! - [`NeighborTable`]: finite-radius element neighborhoods for the
//!   nonlocal passes.
//! - [`sparsity`] + the row-parallel assembler: two-pass CSR pattern
//!   construction and value fill, with Dirichlet DOFs split into the
//!   boundary block K_b.
//! - [`cuthill_mckee`]: bandwidth-reducing node permutation.
//! - [`thermal`] / [`mechanical`]: the stationary drivers and their
//!   post-processing (flux, strain/stress recovery).
//! - [`Solver`] and [`Communicator`]: injected capabilities for the
//!   linear solve and inter-process reductions.
//!
//! # Example
//!
//! ```
//! use nlfem::{
//!     BoundaryConditions, Conductivity, FaerCholeskySolver, HeatBc, MaterialGroup, Materials,
//!     Mesh, MeshProxy, Model, NeighborTable, SerialComm, ThermalProperties,
//! };
//! use nlfem::boundary::constant_bc;
//! use nlfem::element::{EdgeKind, ElementKind};
//! use nalgebra::Vector2;
//!
//! let mut mesh = Mesh::new();
//! mesh.add_node(Vector2::new(0.0, 0.0));
//! mesh.add_node(Vector2::new(1.0, 0.0));
//! mesh.add_node(Vector2::new(1.0, 1.0));
//! mesh.add_node(Vector2::new(0.0, 1.0));
//! mesh.add_element(ElementKind::Bilinear, vec![0, 1, 2, 3]).unwrap();
//! mesh.add_boundary_edge("Left", EdgeKind::Linear, vec![3, 0]).unwrap();
//! mesh.add_boundary_edge("Right", EdgeKind::Linear, vec![1, 2]).unwrap();
//! let proxy = MeshProxy::new(mesh).unwrap();
//!
//! let mut materials: Materials<ThermalProperties> = Materials::new();
//! materials.insert(
//!     "default".to_owned(),
//!     MaterialGroup {
//!         physical: ThermalProperties::new(Conductivity::Isotropic(1.0)).unwrap(),
//!         model: Model::local(),
//!     },
//! );
//!
//! let mut conditions = BoundaryConditions::new();
//! conditions.insert("Left".to_owned(), HeatBc::Temperature(constant_bc(0.0)));
//! conditions.insert("Right".to_owned(), HeatBc::Temperature(constant_bc(1.0)));
//!
//! let neighbors = NeighborTable::empty(proxy.elements_count());
//! let solution = nlfem::stationary_heat_equation(
//!     &proxy,
//!     &neighbors,
//!     &materials,
//!     &conditions,
//!     |_| 0.0,
//!     &FaerCholeskySolver::new(),
//!     &SerialComm,
//! )
//! .unwrap();
//! assert_eq!(solution.temperature().len(), 4);
//! ```

mod assembly;
pub mod boundary;
pub mod config;
pub mod constants;
pub mod cuthill_mckee;
pub mod element;
pub mod error;
pub mod influence;
pub mod io;
pub mod material;
pub mod mechanical;
pub mod mesh;
pub mod neighborhood;
pub mod parallel;
pub mod postprocess;
pub mod proxy;
pub mod solver;
pub mod sparse;
pub mod sparsity;
pub mod thermal;
pub mod types;

pub use boundary::{BoundaryConditions, BoundaryFn, ComponentBc, HeatBc, MechanicalBc};
pub use cuthill_mckee::{cuthill_mckee, reverse_cuthill_mckee, NodeGraph};
pub use element::{EdgeKind, ElementKind};
pub use error::{Error, Result};
pub use influence::Influence;
pub use material::{
    Conductivity, ElasticProperties, MaterialGroup, Materials, Model, Theory, ThermalProperties,
};
pub use mechanical::{stationary_elasticity, MechanicalSolution};
pub use mesh::Mesh;
pub use neighborhood::{Balancing, NeighborTable};
pub use parallel::{Communicator, SerialComm};
pub use proxy::MeshProxy;
pub use solver::{FaerCholeskySolver, Solver};
pub use thermal::{stationary_heat_equation, HeatSolution};
pub use types::{Comp, Point2, Vec2};
