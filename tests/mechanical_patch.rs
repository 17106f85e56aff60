//! End-to-end plane-stress scenarios.

use approx::assert_abs_diff_eq;
use nalgebra::Vector2;
use nlfem::boundary::constant_bc;
use nlfem::{
    Balancing, BoundaryConditions, ComponentBc, EdgeKind, ElasticProperties, ElementKind,
    FaerCholeskySolver, Influence, MaterialGroup, Materials, MechanicalBc, Mesh, MeshProxy,
    Model, NeighborTable, Point2, SerialComm,
};
use std::collections::BTreeMap;

fn unit_square_grid(n: usize) -> MeshProxy {
    let mut mesh = Mesh::new();
    for j in 0..=n {
        for i in 0..=n {
            mesh.add_node(Vector2::new(i as f64 / n as f64, j as f64 / n as f64));
        }
    }
    let id = |i: usize, j: usize| j * (n + 1) + i;
    for j in 0..n {
        for i in 0..n {
            mesh.add_element(
                ElementKind::Bilinear,
                vec![id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)],
            )
            .unwrap();
        }
    }
    for i in 0..n {
        mesh.add_boundary_edge("Down", EdgeKind::Linear, vec![id(i, 0), id(i + 1, 0)])
            .unwrap();
        mesh.add_boundary_edge("Up", EdgeKind::Linear, vec![id(i, n), id(i + 1, n)])
            .unwrap();
        mesh.add_boundary_edge("Left", EdgeKind::Linear, vec![id(0, i), id(0, i + 1)])
            .unwrap();
        mesh.add_boundary_edge("Right", EdgeKind::Linear, vec![id(n, i), id(n, i + 1)])
            .unwrap();
    }
    MeshProxy::new(mesh).unwrap()
}

fn materials_with_model(model: Model) -> Materials<ElasticProperties> {
    let mut materials = BTreeMap::new();
    materials.insert(
        "default".to_owned(),
        MaterialGroup {
            physical: ElasticProperties::new(210.0, 0.3).unwrap(),
            model,
        },
    );
    materials
}

/// S4: constant uniaxial strain imposed by Dirichlet translations gives
/// the uniform plane-stress state σ_xx = E ε/(1-ν²), σ_yy = ν σ_xx.
#[test]
fn uniaxial_strain_patch() {
    let proxy = unit_square_grid(4);
    let neighbors = NeighborTable::empty(proxy.elements_count());
    let strain = 1e-3;

    let mut conditions = BoundaryConditions::new();
    for name in ["Down", "Up", "Left", "Right"] {
        conditions.insert(
            name.to_owned(),
            MechanicalBc {
                x: ComponentBc::Translation(Box::new(move |p: Point2| strain * p.x)),
                y: ComponentBc::Translation(constant_bc(0.0)),
            },
        );
    }

    let mut solution = nlfem::stationary_elasticity(
        &proxy,
        &neighbors,
        &materials_with_model(Model::local()),
        &conditions,
        None,
        &FaerCholeskySolver::new(),
        &SerialComm,
    )
    .unwrap();

    let (e, nu) = (210.0, 0.3);
    let sigma_xx = e * strain / (1.0 - nu * nu);
    let displacements: Vec<_> = (0..proxy.nodes_count())
        .map(|v| solution.displacement_at(v))
        .collect();
    let fields = solution.calc_strain_and_stress().unwrap();
    for v in 0..proxy.nodes_count() {
        let p = proxy.mesh().node(v);
        let u = displacements[v];
        assert_abs_diff_eq!(u.x, strain * p.x, epsilon = 1e-12);
        assert_abs_diff_eq!(u.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fields.stress[0][v], sigma_xx, epsilon = 1e-10);
        assert_abs_diff_eq!(fields.stress[1][v], nu * sigma_xx, epsilon = 1e-10);
        assert_abs_diff_eq!(fields.stress[2][v], 0.0, epsilon = 1e-10);
    }
}

/// The same patch on quadratic serendipity elements with a free
/// mid-edge node.
#[test]
fn uniaxial_strain_patch_serendipity() {
    let mut mesh = Mesh::new();
    let coords = [
        (0.0, 0.0),
        (0.5, 0.0),
        (1.0, 0.0),
        (1.0, 0.5),
        (1.0, 1.0),
        (0.5, 1.0),
        (0.0, 1.0),
        (0.0, 0.5),
        (1.5, 0.0),
        (2.0, 0.0),
        (2.0, 0.5),
        (2.0, 1.0),
        (1.5, 1.0),
    ];
    for (x, y) in coords {
        mesh.add_node(Vector2::new(x, y));
    }
    mesh.add_element(
        ElementKind::QuadraticSerendipity,
        vec![0, 1, 2, 3, 4, 5, 6, 7],
    )
    .unwrap();
    mesh.add_element(
        ElementKind::QuadraticSerendipity,
        vec![2, 8, 9, 10, 11, 12, 4, 3],
    )
    .unwrap();
    mesh.add_boundary_edge("Down", EdgeKind::Quadratic, vec![0, 1, 2]).unwrap();
    mesh.add_boundary_edge("Down", EdgeKind::Quadratic, vec![2, 8, 9]).unwrap();
    mesh.add_boundary_edge("Right", EdgeKind::Quadratic, vec![9, 10, 11]).unwrap();
    mesh.add_boundary_edge("Up", EdgeKind::Quadratic, vec![11, 12, 4]).unwrap();
    mesh.add_boundary_edge("Up", EdgeKind::Quadratic, vec![4, 5, 6]).unwrap();
    mesh.add_boundary_edge("Left", EdgeKind::Quadratic, vec![6, 7, 0]).unwrap();
    let proxy = MeshProxy::new(mesh).unwrap();

    let strain = 2e-3;
    let mut conditions = BoundaryConditions::new();
    for name in ["Down", "Up", "Left", "Right"] {
        conditions.insert(
            name.to_owned(),
            MechanicalBc {
                x: ComponentBc::Translation(Box::new(move |p: Point2| strain * p.x)),
                y: ComponentBc::Translation(constant_bc(0.0)),
            },
        );
    }

    let neighbors = NeighborTable::empty(proxy.elements_count());
    let mut solution = nlfem::stationary_elasticity(
        &proxy,
        &neighbors,
        &materials_with_model(Model::local()),
        &conditions,
        None,
        &FaerCholeskySolver::new(),
        &SerialComm,
    )
    .unwrap();

    // The free mid-edge node (1, 0.5) follows the imposed field
    let u = solution.displacement_at(3);
    assert_abs_diff_eq!(u.x, strain, epsilon = 1e-12);
    assert_abs_diff_eq!(u.y, 0.0, epsilon = 1e-12);

    let (e, nu) = (210.0, 0.3);
    let sigma_xx = e * strain / (1.0 - nu * nu);
    let fields = solution.calc_strain_and_stress().unwrap();
    for v in 0..proxy.nodes_count() {
        assert_abs_diff_eq!(fields.stress[0][v], sigma_xx, epsilon = 1e-9);
        assert_abs_diff_eq!(fields.stress[1][v], nu * sigma_xx, epsilon = 1e-9);
    }
}

/// A rigid translation stays exact under the nonlocal theory: the
/// kernel sees zero strain everywhere, so no spurious forces appear.
#[test]
fn nonlocal_rigid_translation() {
    let proxy = unit_square_grid(4);

    let r = 0.3;
    let kernel = Influence::polynomial([r, r], 2, 1).unwrap();
    let materials = materials_with_model(Model::nonlocal(0.5, kernel).unwrap());
    let mut radii = BTreeMap::new();
    radii.insert("default".to_owned(), [r, r]);
    let neighbors = NeighborTable::build(&proxy, &radii, Balancing::Speed);

    let mut conditions = BoundaryConditions::new();
    for name in ["Down", "Up", "Left", "Right"] {
        conditions.insert(
            name.to_owned(),
            MechanicalBc {
                x: ComponentBc::Translation(constant_bc(0.25)),
                y: ComponentBc::Translation(constant_bc(-0.5)),
            },
        );
    }

    let mut solution = nlfem::stationary_elasticity(
        &proxy,
        &neighbors,
        &materials,
        &conditions,
        None,
        &FaerCholeskySolver::new(),
        &SerialComm,
    )
    .unwrap();

    for v in 0..proxy.nodes_count() {
        let u = solution.displacement_at(v);
        assert_abs_diff_eq!(u.x, 0.25, epsilon = 1e-10);
        assert_abs_diff_eq!(u.y, -0.5, epsilon = 1e-10);
    }
    let mises = solution.von_mises().unwrap();
    for v in 0..proxy.nodes_count() {
        assert_abs_diff_eq!(mises[v], 0.0, epsilon = 1e-7);
    }
}
