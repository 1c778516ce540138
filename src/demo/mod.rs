//! The demo programs: build inputs, run naive and tile kernels, print both.
//!
//! Every binary under `src/bin` is a one-line call to [`main`]. The work
//! itself is in [`run`], which takes the output stream and the engine so
//! tests can drive it with a buffer and a scripted engine result.

use std::io::{self, Write};
use std::process::ExitCode;

use crate::conv::{self, ConvMode, Volume};
use crate::error::{Result, TileError};
use crate::kernels::{self, BF16_SHAPE, INT8_SHAPE, INT8_SHAPE_8X8};
use crate::matrix::Matrix;
use crate::matrix::naive::{matmul_naive_f32, matmul_naive_i8};
use crate::tile::{self, GemmShape, TileEngine};

pub const NAIVE_DIVIDER: &str = "----------------------------------------------- Naive result";
pub const AMX_DIVIDER: &str = "----------------------------------------------- AMX result";

/// Printed on stdout when the kernel refuses tile-data permission.
pub const PERMISSION_FAILURE: &str = "\n Fail to do XFEATURE_XTILEDATA \n\n";

/// One of the demo programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    /// 16×32 · 32×16 in bf16, f32 result.
    Bf16Mul,
    /// 16×32 · 32×16 in i8, i32 result.
    Int8Mul,
    /// 8×32 · 32×8 in i8, i32 result.
    Int8Mul8x8,
    /// 160×160×3 input, 3×3 filter, 6 output channels.
    Int8Conv(ConvMode),
}

/// Process entry point shared by the binaries.
///
/// Exit status 0 on success, 1 when anything fails (in practice: tile-data
/// permission refused).
pub fn main(demo: Demo) -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let result = run(demo, &mut out, tile::acquire());
    let flushed = out.flush();

    exit_code(demo, result.and(flushed.map_err(TileError::from)))
}

/// Map the outcome of a run to the process exit status: 0 or 1.
pub fn exit_code(demo: Demo, result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:?} failed: {}", demo, e);
            ExitCode::from(1)
        }
    }
}

/// Run `demo` against `engine`, writing both result blocks to `out`.
///
/// A permission failure writes [`PERMISSION_FAILURE`] and returns the error
/// before any numeric work.
pub fn run<W: Write>(demo: Demo, out: &mut W, engine: Result<Box<dyn TileEngine>>) -> Result<()> {
    let mut engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            if matches!(e, TileError::PermissionDenied { .. }) {
                write!(out, "{}", PERMISSION_FAILURE)?;
                out.flush()?;
            }
            return Err(e);
        }
    };

    let result = match demo {
        Demo::Bf16Mul => run_bf16_mul(engine.as_mut(), out, BF16_SHAPE),
        Demo::Int8Mul => run_int8_mul(engine.as_mut(), out, INT8_SHAPE),
        Demo::Int8Mul8x8 => run_int8_mul(engine.as_mut(), out, INT8_SHAPE_8X8),
        Demo::Int8Conv(mode) => run_int8_conv(engine.as_mut(), out, mode),
    };
    engine.release();
    result
}

/// `a[r][c] = r·0.5 + c·0.5` (m × k) and `b[r][c] = r·0.5 − c·0.5` (k × n).
pub fn bf16_operands(shape: GemmShape) -> (Matrix<f32>, Matrix<f32>) {
    let a = Matrix::from_fn(shape.m, shape.k, |r, c| r as f32 * 0.5 + c as f32 * 0.5);
    let b = Matrix::from_fn(shape.k, shape.n, |r, c| r as f32 * 0.5 - c as f32 * 0.5);
    (a, b)
}

/// `a[r][c] = r + c` (m × k) and `b[r][c] = r − c` (k × n), wrapped to i8.
pub fn int8_operands(shape: GemmShape) -> (Matrix<i8>, Matrix<i8>) {
    let a = Matrix::from_fn(shape.m, shape.k, |r, c| (r as i32 + c as i32) as i8);
    let b = Matrix::from_fn(shape.k, shape.n, |r, c| (r as i32 - c as i32) as i8);
    (a, b)
}

fn run_bf16_mul<W: Write>(engine: &mut dyn TileEngine, out: &mut W, shape: GemmShape) -> Result<()> {
    let (a, b) = bf16_operands(shape);

    let c_naive = matmul_naive_f32(&a, &b);
    let c_amx = kernels::matmul_tiles_f32(engine, &a, &b)?;

    writeln!(out, "{}", NAIVE_DIVIDER)?;
    write_f32_matrix(out, &c_naive)?;
    writeln!(out, "{}", AMX_DIVIDER)?;
    write_f32_matrix(out, &c_amx)?;
    Ok(())
}

fn run_int8_mul<W: Write>(engine: &mut dyn TileEngine, out: &mut W, shape: GemmShape) -> Result<()> {
    let (a, b) = int8_operands(shape);

    let c_naive = matmul_naive_i8(&a, &b);
    let c_amx = kernels::matmul_tiles_i8(engine, &a, &b)?;

    writeln!(out, "{}", NAIVE_DIVIDER)?;
    write_i32_matrix(out, &c_naive)?;
    writeln!(out, "{}", AMX_DIVIDER)?;
    write_i32_matrix(out, &c_amx)?;
    Ok(())
}

fn run_int8_conv<W: Write>(engine: &mut dyn TileEngine, out: &mut W, mode: ConvMode) -> Result<()> {
    let input = conv::demo_input();
    let filter = conv::demo_filter();

    let naive = conv::conv_naive(&input, &filter, mode)?;
    let amx = conv::conv_tiles(engine, &input, &filter, mode)?;

    writeln!(out, "{}", NAIVE_DIVIDER)?;
    write_volume(out, &naive)?;
    writeln!(out, "{}", AMX_DIVIDER)?;
    write_volume(out, &amx)?;
    Ok(())
}

/// One matrix row per line, `{:.6}` and a space per element.
pub fn write_f32_matrix<W: Write>(out: &mut W, m: &Matrix<f32>) -> io::Result<()> {
    for r in 0..m.rows() {
        for v in m.row(r) {
            write!(out, "{:.6} ", v)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One matrix row per line, each element followed by a space.
pub fn write_i32_matrix<W: Write>(out: &mut W, m: &Matrix<i32>) -> io::Result<()> {
    for r in 0..m.rows() {
        for v in m.row(r) {
            write!(out, "{} ", v)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One volume row per line; each pixel as `c0, c1, ...; `.
pub fn write_volume<W: Write>(out: &mut W, v: &Volume<i32>) -> io::Result<()> {
    for r in 0..v.rows() {
        for c in 0..v.cols() {
            let pixel = v.pixel(r, c);
            for (i, x) in pixel.iter().enumerate() {
                write!(out, "{}", x)?;
                if i + 1 < pixel.len() {
                    write!(out, ", ")?;
                }
            }
            write!(out, "; ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_format_matches_printf() {
        let m = Matrix::from_vec(1, 2, vec![2604.0f32, -0.5]).unwrap();
        let mut buf = Vec::new();
        write_f32_matrix(&mut buf, &m).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "2604.000000 -0.500000 \n");
    }

    #[test]
    fn test_volume_format() {
        let v = Volume::from_fn(1, 2, 2, |_, c, k| (c * 10 + k) as i32);
        let mut buf = Vec::new();
        write_volume(&mut buf, &v).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0, 1; 10, 11; \n");
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_code(Demo::Int8Mul, Ok(())), ExitCode::SUCCESS);
        assert_eq!(
            exit_code(Demo::Bf16Mul, Err(TileError::PermissionDenied { errno: 1 })),
            ExitCode::from(1)
        );
    }

    #[test]
    fn test_permission_denial_exits_non_zero() {
        let mut out = Vec::new();
        let result = run(
            Demo::Int8Mul8x8,
            &mut out,
            Err(TileError::PermissionDenied { errno: 1 }),
        );

        assert_eq!(exit_code(Demo::Int8Mul8x8, result), ExitCode::from(1));
        assert_eq!(out, PERMISSION_FAILURE.as_bytes());
    }

    #[test]
    fn test_int8_operands_fit_without_wrapping() {
        let (a, b) = int8_operands(INT8_SHAPE);
        assert_eq!(a[(15, 31)], 46);
        assert_eq!(b[(0, 15)], -15);
        assert_eq!(b[(31, 0)], 31);
    }
}
