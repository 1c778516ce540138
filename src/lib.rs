//! Intel AMX tile matrix multiplication in Rust, checked against naive loops.
//!
//! I wanted to see what programming the AMX tile unit actually takes. Turns
//! out it's: a 64-byte tile configuration, a permission syscall, narrowing
//! f32 to bf16, and interleaving B into 4-byte row groups. This crate does
//! all of that and compares every tile result with a triple loop.
//!
//! ## Usage
//!
//! ```
//! use amxmul::kernels::matmul_tiles_i8;
//! use amxmul::matrix::Matrix;
//! use amxmul::matrix::naive::matmul_naive_i8;
//!
//! let a = Matrix::from_fn(16, 32, |r, c| (r + c) as i8);
//! let b = Matrix::from_fn(32, 16, |r, c| (r as i32 - c as i32) as i8);
//!
//! let mut engine = amxmul::tile::acquire().unwrap();
//! let c = matmul_tiles_i8(engine.as_mut(), &a, &b).unwrap();
//! engine.release();
//!
//! assert_eq!(c, matmul_naive_i8(&a, &b));
//! ```
//!
//! Without AMX hardware, [`tile::acquire`] returns a software emulation of
//! the tile registers, so the same code runs everywhere.
//!
//! ## What's inside
//!
//! - bf16 (`tdpbf16ps`) and int8 (`tdpbssd`) single-tile GEMM
//! - 3×3 multi-channel int8 convolution built from tile multiplies
//! - Truncating f32 → bf16 conversion and the B operand interleave
//! - Demo binaries printing naive and AMX results side by side

pub mod conv;
pub mod demo;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod tile;

pub use error::{Result, TileError};
pub use matrix::Matrix;
pub use tile::{TileEngine, TileSlot, acquire};
