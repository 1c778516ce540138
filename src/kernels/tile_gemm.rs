//! Load, multiply-accumulate, store: one tile GEMM.

use bytemuck::Pod;
use half::bf16;

use crate::error::{Result, TileError};
use crate::matrix::Matrix;
use crate::matrix::bf16::narrow_matrix;
use crate::matrix::repack::interleave;
use crate::tile::{ACC, DotProduct, GemmShape, LHS, RHS, TileEngine};

/// Multiply bf16 operands with f32 accumulation (`tdpbf16ps`).
///
/// `a` is m × k and `b` is k × n, with m ≤ 16, n ≤ 16 and k ≤ 32 (k even).
///
/// ```
/// use amxmul::kernels::matmul_tiles_f32;
/// use amxmul::matrix::Matrix;
/// use amxmul::tile::ScalarTiles;
///
/// let a = Matrix::from_fn(2, 2, |r, c| (r * 2 + c) as f32);
/// let b = Matrix::from_fn(2, 2, |r, c| if r == c { 1.0 } else { 0.0 });
///
/// let c = matmul_tiles_f32(&mut ScalarTiles::new(), &a, &b).unwrap();
/// assert_eq!(c.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
/// ```
pub fn matmul_tiles_bf16(
    engine: &mut dyn TileEngine,
    a: &Matrix<bf16>,
    b: &Matrix<bf16>,
) -> Result<Matrix<f32>> {
    tile_gemm(engine, a, b, DotProduct::Bf16ToF32)
}

/// Narrow f32 operands to bf16 by truncation, then [`matmul_tiles_bf16`].
pub fn matmul_tiles_f32(
    engine: &mut dyn TileEngine,
    a: &Matrix<f32>,
    b: &Matrix<f32>,
) -> Result<Matrix<f32>> {
    matmul_tiles_bf16(engine, &narrow_matrix(a), &narrow_matrix(b))
}

/// Multiply signed i8 operands with i32 accumulation (`tdpbssd`).
///
/// `a` is m × k and `b` is k × n, with m ≤ 16, n ≤ 16 and k ≤ 64
/// (k a multiple of 4).
pub fn matmul_tiles_i8(
    engine: &mut dyn TileEngine,
    a: &Matrix<i8>,
    b: &Matrix<i8>,
) -> Result<Matrix<i32>> {
    tile_gemm(engine, a, b, DotProduct::Int8ToI32)
}

fn tile_gemm<T, Acc>(
    engine: &mut dyn TileEngine,
    a: &Matrix<T>,
    b: &Matrix<T>,
    op: DotProduct,
) -> Result<Matrix<Acc>>
where
    T: Pod + Default,
    Acc: Pod + Default,
{
    if a.cols() != b.rows() {
        return Err(TileError::Dimension {
            expected: format!("B with {} rows", a.cols()),
            actual: format!("B is {}x{}", b.rows(), b.cols()),
        });
    }

    let shape = GemmShape::new(a.rows(), b.cols(), a.cols());
    let config = shape.tile_config(std::mem::size_of::<T>())?;
    let b_packed = interleave(b)?;

    tracing::debug!("{} engine: {:?} {:?}", engine.name(), op, shape);
    engine.configure(&config)?;
    engine.load(LHS, a.as_bytes(), a.stride_bytes())?;
    engine.load(RHS, b_packed.as_bytes(), b_packed.stride_bytes())?;
    engine.zero(ACC)?;
    engine.multiply_accumulate(op, ACC, LHS, RHS)?;

    let mut c = Matrix::<Acc>::zeros(shape.m, shape.n);
    let stride = c.stride_bytes();
    engine.store(ACC, c.as_bytes_mut(), stride)?;
    Ok(c)
}
