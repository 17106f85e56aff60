//! Result sinks: legacy-VTK unstructured grids and CSV dumps.
//!
//! Thin emitters over a writer; the driver decides where the bytes go.

use crate::element::ElementKind;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use std::io::Write;

/// VTK cell-type numbers of the supported element kinds.
fn vtk_cell_type(kind: ElementKind) -> Result<u8> {
    match kind {
        ElementKind::Triangle => Ok(5),
        ElementKind::QuadraticTriangle => Ok(22),
        ElementKind::Bilinear => Ok(9),
        ElementKind::QuadraticSerendipity => Ok(23),
        ElementKind::QuadraticLagrange => Ok(28),
        ElementKind::CubicSerendipity => Err(Error::Mesh(
            "element kind CubicSerendipity has no VTK cell type".to_owned(),
        )),
    }
}

/// VTK node order of a cell (corners before mid-edge nodes).
fn vtk_node_order(kind: ElementKind) -> &'static [usize] {
    match kind {
        ElementKind::Triangle => &[0, 1, 2],
        ElementKind::QuadraticTriangle => &[0, 1, 2, 3, 4, 5],
        ElementKind::Bilinear => &[0, 1, 2, 3],
        ElementKind::QuadraticSerendipity => &[0, 2, 4, 6, 1, 3, 5, 7],
        ElementKind::QuadraticLagrange => &[0, 2, 4, 6, 1, 3, 5, 7, 8],
        ElementKind::CubicSerendipity => &[],
    }
}

fn check_point_data(mesh: &Mesh, data: &[(&str, &[f64])]) -> Result<()> {
    for (name, values) in data {
        if values.len() != mesh.nodes_count() {
            return Err(Error::Parameter(format!(
                "point data \"{}\" has {} values for {} nodes",
                name,
                values.len(),
                mesh.nodes_count()
            )));
        }
    }
    Ok(())
}

/// Write the mesh and nodal scalar fields as an ASCII legacy-VTK
/// unstructured grid.
pub fn save_as_vtk<W: Write>(w: &mut W, mesh: &Mesh, point_data: &[(&str, &[f64])]) -> Result<()> {
    check_point_data(mesh, point_data)?;

    writeln!(w, "# vtk DataFile Version 4.2")?;
    writeln!(w, "Data")?;
    writeln!(w, "ASCII")?;
    writeln!(w, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(w, "POINTS {} double", mesh.nodes_count())?;
    for node in mesh.nodes() {
        writeln!(w, "{} {} 0", node.x, node.y)?;
    }

    let list_size: usize = mesh
        .elements()
        .iter()
        .map(|element| element.nodes.len() + 1)
        .sum();
    writeln!(w, "CELLS {} {}", mesh.elements_count(), list_size)?;
    for element in mesh.elements() {
        vtk_cell_type(element.kind)?;
        write!(w, "{}", element.nodes.len())?;
        for &local in vtk_node_order(element.kind) {
            write!(w, " {}", element.nodes[local])?;
        }
        writeln!(w)?;
    }

    writeln!(w, "CELL_TYPES {}", mesh.elements_count())?;
    for element in mesh.elements() {
        writeln!(w, "{}", vtk_cell_type(element.kind)?)?;
    }

    if !point_data.is_empty() {
        writeln!(w, "POINT_DATA {}", mesh.nodes_count())?;
        for (name, values) in point_data {
            writeln!(w, "SCALARS {} double 1", name)?;
            writeln!(w, "LOOKUP_TABLE default")?;
            for value in *values {
                writeln!(w, "{}", value)?;
            }
        }
    }
    Ok(())
}

/// Write `x,y,value` rows for a nodal field.
pub fn save_as_csv<W: Write>(w: &mut W, mesh: &Mesh, values: &[f64]) -> Result<()> {
    check_point_data(mesh, &[("values", values)])?;
    for (node, value) in mesh.nodes().iter().zip(values) {
        writeln!(w, "{},{},{}", node.x, node.y, value)?;
    }
    Ok(())
}
