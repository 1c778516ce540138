//! Single-tile matrix multiplication on a [`TileEngine`](crate::tile::TileEngine).
//!
//! One call multiplies operands that fit one tile each: C (m × n) in ACC,
//! A (m × k) in LHS and the interleaved B in RHS. The engine is configured
//! for the shape on every call and left configured afterwards; releasing it
//! is up to the caller.
//!
//! Shapes used by the demos:
//! - `BF16_SHAPE`: 16×16 f32 result from 16×32 and 32×16 bf16 operands
//! - `INT8_SHAPE`: 16×16 i32 result from 16×32 and 32×16 i8 operands
//! - `INT8_SHAPE_8X8`: 8×8 i32 result from 8×32 and 32×8 i8 operands

pub mod tile_gemm;

use crate::tile::GemmShape;

pub use tile_gemm::{matmul_tiles_bf16, matmul_tiles_f32, matmul_tiles_i8};

pub const BF16_SHAPE: GemmShape = GemmShape::new(16, 16, 32);
pub const INT8_SHAPE: GemmShape = GemmShape::new(16, 16, 32);
pub const INT8_SHAPE_8X8: GemmShape = GemmShape::new(8, 8, 32);
