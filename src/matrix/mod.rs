//! Dense matrices, naive reference kernels and tile operand layouts.
//!
//! The naive kernels are the correctness oracle for everything under
//! [`crate::kernels`]. `bf16` and `repack` turn a row-major operand into
//! the bytes a tile load expects.

pub mod bf16;
pub mod dense;
pub mod naive;
pub mod repack;

pub use dense::Matrix;
