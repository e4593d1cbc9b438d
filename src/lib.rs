#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod matrix;

pub use matrix::Matrix44;

extern crate assert_float_eq;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatrixError>;

/// Errors reported by matrix construction and inversion.
#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    /// Grid input that is not 4 rows of 4 values.
    #[error("expected a 4x4 grid, got {rows}x{cols}")]
    Shape { rows: usize, cols: usize },
    /// Flat input that does not hold exactly 16 values.
    #[error("expected 16 values in row-major order, got {len}")]
    Length { len: usize },
    /// An input value that is NaN or infinite.
    #[error("value at row {row}, column {col} is not finite: {value}")]
    NonFinite { row: usize, col: usize, value: f64 },
    /// Inversion of a matrix whose determinant is exactly zero.
    #[error("matrix with zero determinant cannot be inverted")]
    Singular,
}
