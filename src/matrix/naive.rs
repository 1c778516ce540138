//! Textbook i-j-k matrix multiplication, the reference for the tile kernels.

use half::bf16;

use super::Matrix;
use super::bf16::bf16_to_fp32;

/// Naive f32 matrix multiplication: `c = a * b`.
///
/// Each output cell is summed over k in order, starting from zero. Use this
/// as a correctness baseline, not for performance.
///
/// # Panics
///
/// Panics if the inner dimensions of `a` and `b` differ.
pub fn matmul_naive_f32(a: &Matrix<f32>, b: &Matrix<f32>) -> Matrix<f32> {
    assert_eq!(a.cols(), b.rows(), "A is {}x{}, B is {}x{}", a.rows(), a.cols(), b.rows(), b.cols());

    let (m, n, k) = (a.rows(), b.cols(), a.cols());
    let mut c = Matrix::zeros(m, n);
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0f32;
            for p in 0..k {
                acc += a[(i, p)] * b[(p, j)];
            }
            c[(i, j)] = acc;
        }
    }
    c
}

/// Naive bf16 multiplication with f32 accumulation.
///
/// Operands are widened (low bits zero) before multiplying, which is what
/// the tile unit sees after narrowing.
pub fn matmul_naive_bf16(a: &Matrix<bf16>, b: &Matrix<bf16>) -> Matrix<f32> {
    matmul_naive_f32(&a.map(bf16_to_fp32), &b.map(bf16_to_fp32))
}

/// Naive i8 × i8 → i32 matrix multiplication.
///
/// Accumulation wraps on overflow, the same as `tdpbssd`.
///
/// # Panics
///
/// Panics if the inner dimensions of `a` and `b` differ.
pub fn matmul_naive_i8(a: &Matrix<i8>, b: &Matrix<i8>) -> Matrix<i32> {
    assert_eq!(a.cols(), b.rows(), "A is {}x{}, B is {}x{}", a.rows(), a.cols(), b.rows(), b.cols());

    let (m, n, k) = (a.rows(), b.cols(), a.cols());
    let mut c = Matrix::zeros(m, n);
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0i32;
            for p in 0..k {
                acc = acc.wrapping_add(a[(i, p)] as i32 * b[(p, j)] as i32);
            }
            c[(i, j)] = acc;
        }
    }
    c
}
