//! Block-interleave layout for the right-hand tile operand.
//!
//! The tile unit reads B as rows of 4-byte groups: every packed row holds,
//! for each output column, the `4 / W` consecutive k-values of that column
//! (W = element width in bytes). So for bf16 pairs of rows are zipped
//! together, and for i8 groups of four.
//!
//! ```text
//! src (k × n)                  dst (k/g × n·g), g = 4 / W
//! dst[r / g][c * g + r % g] = src[r][c]
//! ```

use std::mem::size_of;

use super::Matrix;
use crate::error::{Result, TileError};

/// Number of source rows packed into one tile row for elements of type `T`.
pub fn group_size<T>() -> Result<usize> {
    match size_of::<T>() {
        1 => Ok(4),
        2 => Ok(2),
        w => Err(TileError::Dimension {
            expected: "element width of 1 or 2 bytes".to_string(),
            actual: format!("{} bytes", w),
        }),
    }
}

/// Interleave `src` (rows × cols) into the (rows/g × cols·g) tile layout.
///
/// Fails if the element width isn't 1 or 2 bytes, or if the row count is
/// not a multiple of the group size.
///
/// ```
/// use amxmul::matrix::Matrix;
/// use amxmul::matrix::repack::interleave;
///
/// let b = Matrix::from_vec(4, 2, vec![0i8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
/// let packed = interleave(&b).unwrap();
///
/// assert_eq!((packed.rows(), packed.cols()), (1, 8));
/// assert_eq!(packed.as_slice(), &[0, 2, 4, 6, 1, 3, 5, 7]);
/// ```
pub fn interleave<T: Copy + Default>(src: &Matrix<T>) -> Result<Matrix<T>> {
    let g = group_size::<T>()?;
    if src.rows() % g != 0 {
        return Err(TileError::Dimension {
            expected: format!("row count divisible by {}", g),
            actual: format!("{} rows", src.rows()),
        });
    }

    let mut dst = Matrix::zeros(src.rows() / g, src.cols() * g);
    for r in 0..src.rows() {
        for c in 0..src.cols() {
            dst[(r / g, c * g + r % g)] = src[(r, c)];
        }
    }
    Ok(dst)
}

/// Undo [`interleave`]: recover the (rows·g × cols/g) row-major operand.
pub fn deinterleave<T: Copy + Default>(packed: &Matrix<T>) -> Result<Matrix<T>> {
    let g = group_size::<T>()?;
    if packed.cols() % g != 0 {
        return Err(TileError::Dimension {
            expected: format!("column count divisible by {}", g),
            actual: format!("{} columns", packed.cols()),
        });
    }

    let mut dst = Matrix::zeros(packed.rows() * g, packed.cols() / g);
    for r in 0..dst.rows() {
        for c in 0..dst.cols() {
            dst[(r, c)] = packed[(r / g, c * g + r % g)];
        }
    }
    Ok(dst)
}
