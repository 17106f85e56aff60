//! CSR storage for the assembled stiffness blocks.
//!
//! The assembler stores only the lower triangle of the symmetric free
//! block K (row ≥ col convention) and the rectangular boundary block K_b
//! (rows are free DOFs, columns Dirichlet DOFs). A mirroring conversion
//! to a full symmetric [`nalgebra_sparse::CsrMatrix`] is provided for
//! callers (and solvers) that need the whole matrix.

use nalgebra_sparse::CsrMatrix;

/// Symbolic CSR structure: row offsets and sorted column indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrPattern {
    n_rows: usize,
    n_cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
}

impl CsrPattern {
    /// Assemble a pattern from its raw parts.
    ///
    /// Column indices must be sorted in ascending order within each row.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_offsets: Vec<usize>,
        col_indices: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(row_offsets.len(), n_rows + 1);
        debug_assert_eq!(*row_offsets.last().unwrap_or(&0), col_indices.len());
        debug_assert!(row_offsets
            .windows(2)
            .all(|w| col_indices[w[0]..w[1]].windows(2).all(|c| c[0] < c[1])));
        Self {
            n_rows,
            n_cols,
            row_offsets,
            col_indices,
        }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.col_indices.len()
    }

    /// Column indices of row `r`, ascending.
    #[inline]
    pub fn row_cols(&self, r: usize) -> &[usize] {
        &self.col_indices[self.row_offsets[r]..self.row_offsets[r + 1]]
    }

    /// Storage position of `(r, col)`, if present.
    #[inline]
    pub fn position(&self, r: usize, col: usize) -> Option<usize> {
        let start = self.row_offsets[r];
        self.position_in_row(r, col).map(|offset| start + offset)
    }

    /// Position of `col` within row `r`'s column slice, if present.
    #[inline]
    pub fn position_in_row(&self, r: usize, col: usize) -> Option<usize> {
        self.row_cols(r).binary_search(&col).ok()
    }
}

/// A CSR matrix block: pattern plus values.
#[derive(Debug, Clone)]
pub struct CsrBlock {
    pattern: CsrPattern,
    values: Vec<f64>,
}

impl CsrBlock {
    /// Pair a pattern with per-row value slices produced by the
    /// row-parallel assembler.
    pub fn from_rows(pattern: CsrPattern, rows: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(rows.len(), pattern.n_rows());
        let values = rows.concat();
        debug_assert_eq!(values.len(), pattern.nnz());
        Self { pattern, values }
    }

    /// The symbolic structure.
    pub fn pattern(&self) -> &CsrPattern {
        &self.pattern
    }

    /// Stored value at `(r, col)`, zero if the position is not stored.
    pub fn value(&self, r: usize, col: usize) -> f64 {
        self.pattern
            .position(r, col)
            .map_or(0.0, |pos| self.values[pos])
    }

    /// Column indices and values of row `r`.
    pub fn row(&self, r: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.pattern.row_offsets[r];
        let end = self.pattern.row_offsets[r + 1];
        self.pattern.col_indices[start..end]
            .iter()
            .zip(&self.values[start..end])
            .map(|(&col, &value)| (col, value))
    }

    /// The block as stored (no mirroring).
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        CsrMatrix::try_from_csr_data(
            self.pattern.n_rows,
            self.pattern.n_cols,
            self.pattern.row_offsets.clone(),
            self.pattern.col_indices.clone(),
            self.values.clone(),
        )
        .expect("CsrBlock holds valid CSR data")
    }

    /// Mirror the stored lower triangle into a full symmetric matrix.
    pub fn to_symmetric_csr(&self) -> CsrMatrix<f64> {
        let n = self.pattern.n_rows;
        let mut counts = vec![0usize; n];
        for r in 0..n {
            for &col in self.pattern.row_cols(r) {
                counts[r] += 1;
                if col != r {
                    counts[col] += 1;
                }
            }
        }

        let mut offsets = vec![0usize; n + 1];
        for r in 0..n {
            offsets[r + 1] = offsets[r] + counts[r];
        }
        let nnz = offsets[n];
        let mut cols = vec![0usize; nnz];
        let mut values = vec![0.0; nnz];
        let mut cursor = offsets[..n].to_vec();

        // Iterating the stored rows in order keeps every mirrored row
        // sorted: lower entries land first, upper entries are appended
        // in ascending row order of their source.
        for r in 0..n {
            for (col, value) in self.row(r) {
                cols[cursor[r]] = col;
                values[cursor[r]] = value;
                cursor[r] += 1;
                if col != r {
                    cols[cursor[col]] = r;
                    values[cursor[col]] = value;
                    cursor[col] += 1;
                }
            }
        }

        CsrMatrix::try_from_csr_data(n, n, offsets, cols, values)
            .expect("mirrored CSR data is valid")
    }
}
