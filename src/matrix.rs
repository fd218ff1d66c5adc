//! Row-major matrices and rows over borrowed or owned `f32` storage.
//!
//! [`Matrix<S>`] and [`Row<S>`] are generic over their storage `S`:
//!
//! - `Block<'a>`: carved from an [`Arena`] (or the heap fallback), see [`Matrix::new_in`]
//! - `Vec<f32>`: owned, see [`Matrix::zeros`] / [`Matrix::from_vec`]
//! - `&[f32]` / `&mut [f32]`: views returned by `view`, `row_slice`, `as_matrix`, ...
//!
//! Views never copy: writing through a `MatrixViewMut` writes the backing storage.
//!
//! Shape and index misuse inside this module is programmer error and panics via
//! `assert!`. Constructors that take external data return [`Result`].

use rand::Rng;

use crate::arena::{self, Arena, Block};
use crate::matmul::matmul_into;
use crate::{Activation, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<S = Vec<f32>> {
    rows: usize,
    cols: usize,
    data: S,
}

/// Read-only matrix view.
pub type MatrixView<'a> = Matrix<&'a [f32]>;
/// Mutable matrix view.
pub type MatrixViewMut<'a> = Matrix<&'a mut [f32]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Row<S = Vec<f32>> {
    data: S,
}

/// Read-only row view.
pub type RowView<'a> = Row<&'a [f32]>;
/// Mutable row view.
pub type RowViewMut<'a> = Row<&'a mut [f32]>;

impl<'a> Matrix<Block<'a>> {
    /// Allocate a zeroed `(rows, cols)` matrix from `arena`, or from the heap when
    /// `arena` is `None`.
    pub fn new_in(arena: Option<&'a Arena>, rows: usize, cols: usize) -> Result<Self> {
        let data = arena::allocate(arena, rows * cols)?;
        Ok(Self { rows, cols, data })
    }
}

impl Matrix<Vec<f32>> {
    /// Heap-allocated zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidShape(format!(
                "buffer length {} does not match rows * cols ({rows} * {cols})",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from per-row vectors (copies into contiguous storage).
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }
}

impl<S: AsRef<[f32]>> Matrix<S> {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_ref()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of range for ({}, {}) matrix",
            self.rows,
            self.cols
        );
        self.as_slice()[row * self.cols + col]
    }

    /// Element at linear (row-major) index `idx`.
    #[inline]
    pub fn at(&self, idx: usize) -> f32 {
        assert!(
            idx < self.len(),
            "index {idx} out of range for matrix of {} elements",
            self.len()
        );
        self.as_slice()[idx]
    }

    /// Returns row `row` (shape: `(cols,)`).
    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        assert!(
            row < self.rows,
            "row {row} out of range for {} rows",
            self.rows
        );
        let start = row * self.cols;
        &self.as_slice()[start..start + self.cols]
    }

    #[inline]
    pub fn view(&self) -> MatrixView<'_> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.as_slice(),
        }
    }

    /// View of rows `[start, start + num_rows)`.
    pub fn row_slice(&self, start: usize, num_rows: usize) -> MatrixView<'_> {
        assert!(
            start + num_rows <= self.rows,
            "row slice [{start}, {}) out of range for {} rows",
            start + num_rows,
            self.rows
        );
        let cols = self.cols;
        Matrix {
            rows: num_rows,
            cols,
            data: &self.as_slice()[start * cols..(start + num_rows) * cols],
        }
    }

    /// Copy into an owned heap matrix.
    pub fn to_owned_matrix(&self) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.as_slice().to_vec(),
        }
    }
}

impl<S: AsRef<[f32]> + AsMut<[f32]>> Matrix<S> {
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.data.as_mut()
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of range for ({}, {}) matrix",
            self.rows,
            self.cols
        );
        let cols = self.cols;
        self.as_mut_slice()[row * cols + col] = value;
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        assert!(
            row < self.rows,
            "row {row} out of range for {} rows",
            self.rows
        );
        let cols = self.cols;
        &mut self.as_mut_slice()[row * cols..(row + 1) * cols]
    }

    #[inline]
    pub fn view_mut(&mut self) -> MatrixViewMut<'_> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.as_mut(),
        }
    }

    /// Mutable view of rows `[start, start + num_rows)`.
    pub fn row_slice_mut(&mut self, start: usize, num_rows: usize) -> MatrixViewMut<'_> {
        assert!(
            start + num_rows <= self.rows,
            "row slice [{start}, {}) out of range for {} rows",
            start + num_rows,
            self.rows
        );
        let cols = self.cols;
        Matrix {
            rows: num_rows,
            cols,
            data: &mut self.data.as_mut()[start * cols..(start + num_rows) * cols],
        }
    }

    /// Split into two disjoint mutable views: rows `[0, mid)` and `[mid, rows)`.
    pub fn split_rows_at_mut(&mut self, mid: usize) -> (MatrixViewMut<'_>, MatrixViewMut<'_>) {
        assert!(
            mid <= self.rows,
            "split point {mid} out of range for {} rows",
            self.rows
        );
        let (rows, cols) = (self.rows, self.cols);
        let (top, bottom) = self.data.as_mut().split_at_mut(mid * cols);
        (
            Matrix {
                rows: mid,
                cols,
                data: top,
            },
            Matrix {
                rows: rows - mid,
                cols,
                data: bottom,
            },
        )
    }

    pub fn fill(&mut self, value: f32) {
        self.as_mut_slice().fill(value);
    }

    /// Fill with values drawn uniformly from `[min, max)`.
    ///
    /// `min == max` fills with `min`. Panics if `min > max`.
    pub fn fill_random<R: Rng + ?Sized>(&mut self, min: f32, max: f32, rng: &mut R) {
        fill_uniform(self.as_mut_slice(), min, max, rng);
    }

    /// `self += src`, element-wise. Shapes must match exactly.
    pub fn add_elementwise<T: AsRef<[f32]>>(&mut self, src: &Matrix<T>) {
        self.assert_same_shape(src);
        for (d, &s) in self.as_mut_slice().iter_mut().zip(src.as_slice()) {
            *d += s;
        }
    }

    /// Element-wise copy. Shapes must match exactly.
    pub fn copy_from<T: AsRef<[f32]>>(&mut self, src: &Matrix<T>) {
        self.assert_same_shape(src);
        self.as_mut_slice().copy_from_slice(src.as_slice());
    }

    pub fn apply_activation(&mut self, activation: Activation) {
        for v in self.as_mut_slice() {
            *v = activation.forward(*v);
        }
    }

    /// Swap the full contents of two rows.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        assert!(
            a < self.rows && b < self.rows,
            "rows ({a}, {b}) out of range for {} rows",
            self.rows
        );
        if a == b {
            return;
        }
        let cols = self.cols;
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.as_mut_slice().split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Uniformly permute rows in place (Fisher-Yates over whole rows).
    pub fn shuffle_rows<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let rows = self.rows;
        if rows <= 1 {
            return;
        }
        for i in 0..rows - 1 {
            let j = rng.gen_range(i..rows);
            self.swap_rows(i, j);
        }
    }

    /// Rescale each of the first `num_cols` columns independently to `[new_min, new_max]`.
    ///
    /// A constant column is divided by 1 instead of its (zero) range, so all its
    /// values map to `new_min`.
    pub fn normalize_minmax(&mut self, num_cols: usize, new_min: f32, new_max: f32) {
        assert!(
            num_cols <= self.cols,
            "cannot normalize {num_cols} columns of a {}-column matrix",
            self.cols
        );
        if self.rows == 0 {
            return;
        }

        let (rows, cols) = (self.rows, self.cols);
        let data = self.as_mut_slice();
        for col in 0..num_cols {
            let mut min = data[col];
            let mut max = data[col];
            for row in 1..rows {
                let v = data[row * cols + col];
                if v < min {
                    min = v;
                }
                if v > max {
                    max = v;
                }
            }

            let mut range = max - min;
            if range == 0.0 {
                range = 1.0;
            }

            for row in 0..rows {
                let v = &mut data[row * cols + col];
                *v = (*v - min) / range * (new_max - new_min) + new_min;
            }
        }
    }

    #[inline]
    fn assert_same_shape<T: AsRef<[f32]>>(&self, other: &Matrix<T>) {
        assert!(
            self.rows == other.rows && self.cols == other.cols,
            "shape mismatch: ({}, {}) vs ({}, {})",
            self.rows,
            self.cols,
            other.rows,
            other.cols
        );
    }
}

/// Dense product `result = a * b`.
///
/// Shape contract: `a.cols() == b.rows()`, `result` is `(a.rows(), b.cols())`.
pub fn multiply<R, A, B>(result: &mut Matrix<R>, a: &Matrix<A>, b: &Matrix<B>)
where
    R: AsRef<[f32]> + AsMut<[f32]>,
    A: AsRef<[f32]>,
    B: AsRef<[f32]>,
{
    assert_eq!(
        a.cols, b.rows,
        "cannot multiply ({}, {}) by ({}, {})",
        a.rows, a.cols, b.rows, b.cols
    );
    assert!(
        result.rows == a.rows && result.cols == b.cols,
        "result shape ({}, {}) does not match product shape ({}, {})",
        result.rows,
        result.cols,
        a.rows,
        b.cols
    );

    matmul_into(
        a.rows,
        b.cols,
        a.cols,
        a.as_slice(),
        b.as_slice(),
        result.as_mut_slice(),
    );
}

/// Index of the largest value; ties resolve to the lowest index. Returns 0 for
/// an empty slice.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

pub(crate) fn fill_uniform<R: Rng + ?Sized>(values: &mut [f32], min: f32, max: f32, rng: &mut R) {
    assert!(min <= max, "invalid range [{min}, {max})");
    if min == max {
        values.fill(min);
        return;
    }
    for v in values {
        *v = rng.gen_range(min..max);
    }
}

impl<'a> Row<Block<'a>> {
    /// Allocate a zeroed row from `arena`, or from the heap when `arena` is `None`.
    pub fn new_in(arena: Option<&'a Arena>, len: usize) -> Result<Self> {
        Ok(Self {
            data: arena::allocate(arena, len)?,
        })
    }
}

impl Row<Vec<f32>> {
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    pub fn from_vec(data: Vec<f32>) -> Self {
        Self { data }
    }
}

impl<S: AsRef<[f32]>> Row<S> {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_ref()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> f32 {
        assert!(
            idx < self.len(),
            "index {idx} out of range for row of len {}",
            self.len()
        );
        self.as_slice()[idx]
    }

    /// View of `[start, start + len)`.
    pub fn slice(&self, start: usize, len: usize) -> RowView<'_> {
        assert!(
            start + len <= self.len(),
            "slice [{start}, {}) out of range for row of len {}",
            start + len,
            self.len()
        );
        Row {
            data: &self.as_slice()[start..start + len],
        }
    }

    /// Reinterpret as a `(1, len)` matrix view.
    #[inline]
    pub fn as_matrix(&self) -> MatrixView<'_> {
        Matrix {
            rows: 1,
            cols: self.len(),
            data: self.as_slice(),
        }
    }

    #[inline]
    pub fn argmax(&self) -> usize {
        argmax(self.as_slice())
    }
}

impl<S: AsRef<[f32]> + AsMut<[f32]>> Row<S> {
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.data.as_mut()
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: f32) {
        assert!(
            idx < self.len(),
            "index {idx} out of range for row of len {}",
            self.len()
        );
        self.as_mut_slice()[idx] = value;
    }

    pub fn fill(&mut self, value: f32) {
        self.as_mut_slice().fill(value);
    }

    /// Element-wise copy from a slice of the same length.
    pub fn copy_from_slice(&mut self, src: &[f32]) {
        assert_eq!(
            self.len(),
            src.len(),
            "row len {} does not match source len {}",
            self.len(),
            src.len()
        );
        self.as_mut_slice().copy_from_slice(src);
    }

    pub fn slice_mut(&mut self, start: usize, len: usize) -> RowViewMut<'_> {
        assert!(
            start + len <= self.len(),
            "slice [{start}, {}) out of range for row of len {}",
            start + len,
            self.len()
        );
        Row {
            data: &mut self.as_mut_slice()[start..start + len],
        }
    }

    /// Reinterpret as a mutable `(1, len)` matrix view.
    #[inline]
    pub fn as_matrix_mut(&mut self) -> MatrixViewMut<'_> {
        let cols = self.len();
        Matrix {
            rows: 1,
            cols,
            data: self.as_mut_slice(),
        }
    }
}
