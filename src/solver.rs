//! Injected linear-solver capability.
//!
//! The core produces a symmetric sparse matrix and a right-hand side;
//! solving is behind the [`Solver`] trait so embedders can plug in
//! whatever backend fits. The bundled [`FaerCholeskySolver`] uses faer's
//! sparse LLᵀ factorization, which suits the symmetric positive-definite
//! matrices produced after Dirichlet elimination.

use crate::error::{Error, Result};
use faer::linalg::cholesky::llt::factor::LltError;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use faer::sparse::linalg::LltError as SparseLltError;
use faer::prelude::Solve;
use faer::sparse::{SparseColMat, SymbolicSparseColMat};
use nalgebra_sparse::CsrMatrix;

/// Linear solver interface.
pub trait Solver: Send + Sync {
    /// Solve the linear system `K u = f`.
    fn solve(&self, matrix: &CsrMatrix<f64>, rhs: &[f64]) -> Result<Vec<f64>>;

    /// Solver name for diagnostics.
    fn name(&self) -> &str;
}

/// Convert a nalgebra-sparse CSR matrix to a faer CSC matrix.
///
/// The assembled matrices are symmetric, so CSR of K equals CSC of Kᵀ =
/// CSC of K; the conversion only reshuffles the index arrays.
fn csr_to_faer_csc(csr: &CsrMatrix<f64>) -> SparseColMat<usize, f64> {
    let nrows = csr.nrows();
    let ncols = csr.ncols();

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    let mut col_counts = vec![0usize; ncols];
    for &col in col_indices {
        col_counts[col] += 1;
    }

    let mut col_offsets = vec![0usize; ncols + 1];
    for i in 0..ncols {
        col_offsets[i + 1] = col_offsets[i] + col_counts[i];
    }

    let nnz = values.len();
    let mut csc_row_indices = vec![0usize; nnz];
    let mut csc_values = vec![0.0f64; nnz];
    let mut col_positions = col_offsets[..ncols].to_vec();

    for row in 0..nrows {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let col = col_indices[idx];
            let pos = col_positions[col];
            csc_row_indices[pos] = row;
            csc_values[pos] = values[idx];
            col_positions[col] += 1;
        }
    }

    // SAFETY: the arrays above form a structurally valid CSC matrix.
    unsafe {
        SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(nrows, ncols, col_offsets, None, csc_row_indices),
            csc_values,
        )
    }
}

/// Sparse Cholesky (LLᵀ) solver backed by faer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerCholeskySolver;

impl FaerCholeskySolver {
    /// Create a new sparse Cholesky solver.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for FaerCholeskySolver {
    fn solve(&self, matrix: &CsrMatrix<f64>, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = matrix.nrows();
        if n == 0 {
            return Ok(vec![]);
        }
        if n != matrix.ncols() {
            return Err(Error::Solver("matrix must be square".into()));
        }
        if n != rhs.len() {
            return Err(Error::Solver("RHS size mismatch".into()));
        }

        let csc = csr_to_faer_csc(matrix);
        let csc_ref = csc.as_ref();

        let symbolic = SymbolicLlt::try_new(csc_ref.symbolic(), faer::Side::Lower)
            .map_err(|_| Error::Solver("symbolic Cholesky analysis failed".into()))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc_ref, faer::Side::Lower).map_err(
            |e| match e {
                SparseLltError::Generic(err) => {
                    Error::Solver(format!("sparse Cholesky error: {:?}", err))
                }
                SparseLltError::Numeric(LltError::NonPositivePivot { index }) => {
                    Error::SingularMatrix(format!(
                        "matrix is not positive definite at pivot {}",
                        index
                    ))
                }
            },
        )?;

        let mut x = faer::Mat::from_fn(n, 1, |i, _| rhs[i]);
        llt.solve_in_place(x.as_mut());

        Ok((0..n).map(|i| x[(i, 0)]).collect())
    }

    fn name(&self) -> &str {
        "faer sparse Cholesky (LLᵀ)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra_sparse::CooMatrix;

    fn csr_from_triplets(n: usize, triplets: &[(usize, usize, f64)]) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(n, n);
        for &(r, c, v) in triplets {
            coo.push(r, c, v);
        }
        CsrMatrix::from(&coo)
    }

    #[test]
    fn test_cholesky_simple_spd() {
        // [4 2; 2 3] x = [4; 5] has solution [0.25, 1.5]
        let matrix = csr_from_triplets(2, &[(0, 0, 4.0), (0, 1, 2.0), (1, 0, 2.0), (1, 1, 3.0)]);
        let solution = FaerCholeskySolver::new().solve(&matrix, &[4.0, 5.0]).unwrap();
        assert_relative_eq!(solution[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(solution[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_identity() {
        let matrix = csr_from_triplets(3, &[(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0)]);
        let rhs = vec![1.0, -2.0, 3.0];
        let solution = FaerCholeskySolver::new().solve(&matrix, &rhs).unwrap();
        for (a, b) in solution.iter().zip(&rhs) {
            assert_relative_eq!(a, b, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_cholesky_banded_spd() {
        // Tridiagonal SPD system, verified by its residual
        let mut triplets = Vec::new();
        for i in 0..6 {
            triplets.push((i, i, 4.0));
        }
        for i in 0..5 {
            triplets.push((i, i + 1, -1.0));
            triplets.push((i + 1, i, -1.0));
        }
        let matrix = csr_from_triplets(6, &triplets);
        let rhs = vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0];

        let solution = FaerCholeskySolver::new().solve(&matrix, &rhs).unwrap();
        let dense = nalgebra::DMatrix::from(&matrix);
        let x = nalgebra::DVector::from_vec(solution);
        let b = nalgebra::DVector::from_vec(rhs);
        assert!((dense * x - b).norm() < 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        // Eigenvalues 3 and -1
        let matrix = csr_from_triplets(2, &[(0, 0, 1.0), (0, 1, 2.0), (1, 0, 2.0), (1, 1, 1.0)]);
        assert!(FaerCholeskySolver::new().solve(&matrix, &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_cholesky_size_mismatch() {
        let matrix = csr_from_triplets(2, &[(0, 0, 1.0), (1, 1, 1.0)]);
        assert!(FaerCholeskySolver::new()
            .solve(&matrix, &[1.0, 2.0, 3.0])
            .is_err());
    }

    #[test]
    fn test_empty_system() {
        let matrix = csr_from_triplets(0, &[]);
        let solution = FaerCholeskySolver::new().solve(&matrix, &[]).unwrap();
        assert!(solution.is_empty());
    }
}
