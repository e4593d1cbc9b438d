use std::fmt::{Debug, Formatter};
use std::ops::{Index, Mul};

use crate::{MatrixError, Result};

/// Row-major 4x4 homogeneous transformation matrix over `f64`.
///
/// Instances are immutable: every operation returns a new matrix and no
/// method mutates in place. Equality via `==` is exact; use
/// [`Matrix44::close_to`] when comparing the results of floating-point
/// pipelines.
#[derive(Clone, Copy, PartialEq)]
pub struct Matrix44 {
    values: [f64; 16],
}

impl Debug for Matrix44 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[")?;
        for i in 0..Self::ROWS {
            write!(f, "\t")?;
            for j in 0..Self::COLS {
                write!(f, "{}, ", self.values[i * Self::COLS + j])?;
            }
            writeln!(f)?;
        }
        writeln!(f, "]")
    }
}

impl Matrix44 {
    const COLS: usize = 4;
    const ROWS: usize = 4;

    /// Relative tolerance of [`Matrix44::close_to`] and snapping threshold
    /// of [`Matrix44::zero_rounded`].
    pub const ERR_THRESHOLD: f64 = 1e-9;

    #[rustfmt::skip]
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            values: [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Builds a matrix from 4 rows of 4 values each.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Shape`] if the input is not exactly 4 rows
    /// of 4 values, and [`MatrixError::NonFinite`] if any value is NaN or
    /// infinite.
    pub fn from_grid<R>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[f64]>,
    {
        if rows.len() != Self::ROWS {
            return Err(MatrixError::Shape {
                rows: rows.len(),
                cols: rows.first().map_or(0, |row| row.as_ref().len()),
            });
        }

        let mut values = [0.0; 16];
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != Self::COLS {
                return Err(MatrixError::Shape {
                    rows: rows.len(),
                    cols: row.len(),
                });
            }
            values[r * Self::COLS..(r + 1) * Self::COLS].copy_from_slice(row);
        }

        Self::checked(values)
    }

    /// Builds a matrix from 16 values in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Length`] if the input does not hold exactly
    /// 16 values, and [`MatrixError::NonFinite`] if any value is NaN or
    /// infinite.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        let values: [f64; 16] = values
            .try_into()
            .map_err(|_| MatrixError::Length { len: values.len() })?;
        Self::checked(values)
    }

    fn checked(values: [f64; 16]) -> Result<Self> {
        for (i, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(MatrixError::NonFinite {
                    row: i / Self::COLS,
                    col: i % Self::COLS,
                    value,
                });
            }
        }
        Ok(Self { values })
    }

    /// Returns the 16 values in row-major order.
    #[must_use]
    pub const fn to_flat(&self) -> [f64; 16] {
        self.values
    }

    /// Returns the rows as an independent 4x4 copy.
    #[must_use]
    pub fn to_grid(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; Self::COLS]; Self::ROWS];
        for (r, row) in rows.iter_mut().enumerate() {
            row.copy_from_slice(&self.values[r * Self::COLS..(r + 1) * Self::COLS]);
        }
        rows
    }

    /// Returns true if this matrix is exactly the identity matrix.
    ///
    /// The comparison is strict; round first (for example with
    /// [`Matrix44::zero_rounded`]) when identity is only expected up to
    /// floating-point drift.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Element-wise tolerant comparison with [`Matrix44::ERR_THRESHOLD`]
    /// as the relative tolerance and no absolute floor.
    #[must_use]
    pub fn close_to(&self, other: &Self) -> bool {
        self.close_to_within(other, Self::ERR_THRESHOLD, 0.0)
    }

    /// Element-wise tolerant comparison with caller-supplied tolerances.
    ///
    /// Two values a and b count as close when
    /// `|a - b| <= max(rel_tol * max(|a|, |b|), abs_tol)`.
    #[must_use]
    pub fn close_to_within(&self, other: &Self, rel_tol: f64, abs_tol: f64) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(&a, &b)| is_close(a, b, rel_tol, abs_tol))
    }

    /// Returns a copy with every value within [`Matrix44::ERR_THRESHOLD`]
    /// of zero snapped to exactly 0.0.
    #[must_use]
    pub fn zero_rounded(&self) -> Self {
        self.zero_rounded_within(Self::ERR_THRESHOLD)
    }

    #[must_use]
    pub fn zero_rounded_within(&self, threshold: f64) -> Self {
        let mut values = self.values;
        for value in &mut values {
            if value.abs() <= threshold {
                *value = 0.0;
            }
        }
        Self { values }
    }

    #[must_use]
    pub fn transposed(&self) -> Self {
        let mut values = [0.0; 16];
        for i in 0..Self::ROWS {
            for j in 0..Self::COLS {
                values[i * Self::COLS + j] = self.values[j * Self::COLS + i];
            }
        }
        Self { values }
    }

    /// Computes the determinant by cofactor expansion along the first row.
    ///
    /// A zero determinant is a valid result, not an error; it means the
    /// matrix has no inverse.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        det(&self.values, Self::ROWS)
    }

    /// Returns the inverse, computed by the adjugate method: the cofactor
    /// grid is transposed and divided by the determinant.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Singular`] if the determinant is exactly
    /// zero. The check happens before any division, so a singular matrix
    /// never yields values of infinities. Near-singular matrices with a
    /// tiny but nonzero determinant are not detected and invert to values
    /// of large magnitude.
    pub fn inverted(&self) -> Result<Self> {
        let determinant = self.determinant();
        if determinant == 0.0 {
            return Err(MatrixError::Singular);
        }

        let mut cofactors = [0.0; 16];
        for r in 0..Self::ROWS {
            for c in 0..Self::COLS {
                let sub = minor(&self.values, Self::ROWS, r, c);
                let d = det(&sub, Self::ROWS - 1);
                cofactors[r * Self::COLS + c] = if (r + c) % 2 == 0 { d } else { -d };
            }
        }

        let mut values = Self { values: cofactors }.transposed().values;
        for value in &mut values {
            *value /= determinant;
        }
        Ok(Self { values })
    }
}

impl Default for Matrix44 {
    /// The identity matrix, the neutral element of composition.
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix44 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut values = [0.0; 16];

        for j in 0..4 {
            for i in 0..4 {
                values[j * Self::COLS + i] = self.values[j * Self::COLS] * rhs.values[i]
                    + self.values[j * Self::COLS + 1] * rhs.values[i + Self::COLS]
                    + self.values[j * Self::COLS + 2] * rhs.values[i + Self::COLS * 2]
                    + self.values[j * Self::COLS + 3] * rhs.values[i + Self::COLS * 3];
            }
        }

        Self { values }
    }
}

impl Index<usize> for Matrix44 {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index * Self::COLS..index * Self::COLS + Self::COLS]
    }
}

impl TryFrom<[[f64; 4]; 4]> for Matrix44 {
    type Error = MatrixError;

    fn try_from(rows: [[f64; 4]; 4]) -> Result<Self> {
        Self::from_grid(&rows)
    }
}

impl From<Matrix44> for [[f64; 4]; 4] {
    fn from(matrix: Matrix44) -> Self {
        matrix.to_grid()
    }
}

impl From<Matrix44> for [f64; 16] {
    fn from(matrix: Matrix44) -> Self {
        matrix.to_flat()
    }
}

/// Returns the sub-grid of `cells` (row-major, `size` values per row) with
/// `row` and `col` deleted, packed row-major at the front of the buffer.
/// Deleting a row and a column of a 4x4 grid leaves at most 9 cells.
fn minor(cells: &[f64], size: usize, row: usize, col: usize) -> [f64; 9] {
    let mut sub = [0.0; 9];
    let mut next = 0;
    for r in 0..size {
        if r == row {
            continue;
        }
        for c in 0..size {
            if c == col {
                continue;
            }
            sub[next] = cells[r * size + c];
            next += 1;
        }
    }
    sub
}

/// Determinant of a square grid by Laplace expansion along the first row,
/// recursing on minors down to the 2x2 base case.
fn det(cells: &[f64], size: usize) -> f64 {
    if size == 2 {
        return cells[0] * cells[3] - cells[1] * cells[2];
    }

    let sub_size = size - 1;
    let mut determinant = 0.0;
    for col in 0..size {
        let sub = minor(cells, size, 0, col);
        let cofactor = det(&sub[..sub_size * sub_size], sub_size);
        if col % 2 == 0 {
            determinant += cells[col] * cofactor;
        } else {
            determinant -= cells[col] * cofactor;
        }
    }
    determinant
}

fn is_close(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    (a - b).abs() <= f64::max(rel_tol * f64::max(a.abs(), b.abs()), abs_tol)
}
