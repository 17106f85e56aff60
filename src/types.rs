//! Core data types shared across the solver.

use nalgebra::Vector2;

/// A point in 2D space.
pub type Point2 = Vector2<f64>;

/// A 2D vector (gradient, flux, displacement at a point).
pub type Vec2 = Vector2<f64>;

/// Displacement component of a vector degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comp {
    X = 0,
    Y = 1,
}

impl Comp {
    /// Both components, in DOF order.
    pub const ALL: [Comp; 2] = [Comp::X, Comp::Y];

    /// Component index within a node's DOF block.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Global DOF index of `(node, comp)` in a two-component problem.
///
/// Scalar problems use the node index directly as the DOF index.
#[inline]
pub fn vector_dof(node: usize, comp: Comp) -> usize {
    2 * node + comp.index()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_dof_layout() {
        assert_eq!(vector_dof(0, Comp::X), 0);
        assert_eq!(vector_dof(0, Comp::Y), 1);
        assert_eq!(vector_dof(7, Comp::X), 14);
        assert_eq!(vector_dof(7, Comp::Y), 15);
    }
}
