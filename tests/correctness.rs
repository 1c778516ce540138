use amxmul::conv::{self, ConvMode, FilterBank, Volume, conv_naive, conv_tiles};
use amxmul::demo::{self, AMX_DIVIDER, Demo, NAIVE_DIVIDER, PERMISSION_FAILURE};
use amxmul::kernels::{
    BF16_SHAPE, INT8_SHAPE, INT8_SHAPE_8X8, matmul_tiles_bf16, matmul_tiles_f32, matmul_tiles_i8,
};
use amxmul::matrix::Matrix;
use amxmul::matrix::bf16::narrow_matrix;
use amxmul::matrix::naive::{matmul_naive_bf16, matmul_naive_f32, matmul_naive_i8};
use amxmul::tile::permission::request_tile_data;
use amxmul::tile::{ScalarTiles, TileEngine};
use amxmul::TileError;

fn assert_matrices_equal(expected: &Matrix<f32>, actual: &Matrix<f32>, name: &str) {
    assert_eq!(
        (expected.rows(), expected.cols()),
        (actual.rows(), actual.cols()),
        "{}: shape mismatch",
        name
    );
    for (i, (e, a)) in expected.as_slice().iter().zip(actual.as_slice()).enumerate() {
        assert!(
            e.to_bits() == a.to_bits(),
            "{}: mismatch at index {}: expected {}, got {}",
            name,
            i,
            e,
            a
        );
    }
}

#[cfg(target_arch = "x86_64")]
fn hardware_engine() -> Option<Box<dyn TileEngine>> {
    use amxmul::tile::amx::AmxTiles;

    if !AmxTiles::is_supported() || request_tile_data().is_err() {
        println!("Skipping - AMX not available");
        return None;
    }
    AmxTiles::new().ok().map(|e| Box::new(e) as Box<dyn TileEngine>)
}

#[cfg(not(target_arch = "x86_64"))]
fn hardware_engine() -> Option<Box<dyn TileEngine>> {
    let _ = request_tile_data();
    println!("Skipping - AMX not available");
    None
}

// ============================================================
// Reference kernels
// ============================================================

#[test]
fn test_bf16_demo_naive_corner_is_exact() {
    let (a, b) = demo::bf16_operands(BF16_SHAPE);

    let c = matmul_naive_f32(&a, &b);

    // Row 0 of A is k·0.5, column 0 of B is k·0.5.
    let expected: f32 = (0..32).map(|k| (k as f32 * 0.5) * (k as f32 * 0.5)).sum();
    assert_eq!(expected, 2604.0);
    assert_eq!(c[(0, 0)], expected);
}

#[test]
fn test_int8_demo_naive_corner_is_exact() {
    let (a, b) = demo::int8_operands(INT8_SHAPE);

    let c = matmul_naive_i8(&a, &b);

    // Σ (0 + k)(k - 15) over k < 32
    let expected: i32 = (0..32).map(|k| k * (k - 15)).sum();
    assert_eq!(c[(0, 15)], expected);
}

// ============================================================
// Tile GEMM on the software engine
// ============================================================

#[test]
fn test_bf16_tiles_match_naive() {
    let (a, b) = demo::bf16_operands(BF16_SHAPE);

    let c_naive = matmul_naive_f32(&a, &b);
    let c_tiles = matmul_tiles_f32(&mut ScalarTiles::new(), &a, &b).unwrap();

    assert_matrices_equal(&c_naive, &c_tiles, "bf16_16x16x32");
}

#[test]
fn test_bf16_tiles_see_truncated_operands() {
    // 1 + 2^-8 + 2^-9 truncates to 1.0; rounding would give 1 + 2^-7.
    let a = Matrix::from_fn(2, 2, |_, _| 1.0f32 + 1.0 / 256.0 + 1.0 / 512.0);
    let b = Matrix::from_fn(2, 2, |_, _| 1.0f32);

    let c = matmul_tiles_f32(&mut ScalarTiles::new(), &a, &b).unwrap();

    let expected = matmul_naive_bf16(&narrow_matrix(&a), &narrow_matrix(&b));
    assert_matrices_equal(&expected, &c, "truncated");
    assert_eq!(c[(0, 0)], 2.0);
}

#[test]
fn test_bf16_odd_sizes_within_one_tile() {
    for (m, n, k) in [(1, 1, 2), (3, 5, 4), (16, 1, 32), (7, 16, 10)] {
        let a = Matrix::from_fn(m, k, |r, c| (r as f32 - c as f32) * 0.25);
        let b = Matrix::from_fn(k, n, |r, c| (r * n + c) as f32 * 0.5);

        let na = narrow_matrix(&a);
        let nb = narrow_matrix(&b);
        let c = matmul_tiles_bf16(&mut ScalarTiles::new(), &na, &nb).unwrap();

        assert_matrices_equal(&matmul_naive_bf16(&na, &nb), &c, &format!("{}x{}x{}", m, n, k));
    }
}

#[test]
fn test_int8_tiles_match_naive() {
    for shape in [INT8_SHAPE, INT8_SHAPE_8X8] {
        let (a, b) = demo::int8_operands(shape);

        let c = matmul_tiles_i8(&mut ScalarTiles::new(), &a, &b).unwrap();

        assert_eq!(c, matmul_naive_i8(&a, &b), "{:?}", shape);
        assert_eq!((c.rows(), c.cols()), (shape.m, shape.n));
    }
}

#[test]
fn test_int8_extremes_wrap_like_hardware() {
    let a = Matrix::from_fn(16, 64, |_, _| i8::MIN);
    let b = Matrix::from_fn(64, 16, |r, _| if r % 2 == 0 { i8::MIN } else { i8::MAX });

    let c = matmul_tiles_i8(&mut ScalarTiles::new(), &a, &b).unwrap();

    assert_eq!(c, matmul_naive_i8(&a, &b));
    assert_eq!(c[(0, 0)], 32 * 16384 + 32 * -16256);
}

#[test]
fn test_shape_errors_are_reported() {
    let a = Matrix::<i8>::zeros(16, 32);
    let b = Matrix::<i8>::zeros(16, 16);
    assert!(matches!(
        matmul_tiles_i8(&mut ScalarTiles::new(), &a, &b),
        Err(TileError::Dimension { .. })
    ));

    // k = 6 bytes of i8 doesn't fill the last 4-byte group.
    let a = Matrix::<i8>::zeros(4, 6);
    let b = Matrix::<i8>::zeros(6, 4);
    assert!(matches!(
        matmul_tiles_i8(&mut ScalarTiles::new(), &a, &b),
        Err(TileError::ShapeMismatch(_))
    ));
}

// ============================================================
// Convolution
// ============================================================

#[test]
fn test_conv_output_extent_per_mode() {
    let input = conv::demo_input();
    let filter = conv::demo_filter();

    let valid = conv_naive(&input, &filter, ConvMode::Valid).unwrap();
    assert_eq!((valid.rows(), valid.cols(), valid.channels()), (158, 158, 6));

    let full = conv_naive(&input, &filter, ConvMode::FullExtent).unwrap();
    assert_eq!((full.rows(), full.cols(), full.channels()), (160, 160, 6));

    // Interior positions agree between the modes.
    assert_eq!(valid.pixel(100, 57), full.pixel(100, 57));
}

#[test]
fn test_conv_tiles_match_naive_on_demo_input() {
    let input = conv::demo_input();
    let filter = conv::demo_filter();

    for mode in [ConvMode::Valid, ConvMode::FullExtent] {
        let expected = conv_naive(&input, &filter, mode).unwrap();
        let actual = conv_tiles(&mut ScalarTiles::new(), &input, &filter, mode).unwrap();
        assert!(actual == expected, "conv {:?} differs from naive", mode);
    }
}

#[test]
fn test_conv_single_pixel_by_hand() {
    let input = Volume::from_fn(3, 3, 2, |r, c, ic| (r * 3 + c + ic) as i8);
    let filter = FilterBank::from_fn(3, 2, 1, |ic, _, _, _| if ic == 0 { 1 } else { -1 });

    let out = conv_tiles(&mut ScalarTiles::new(), &input, &filter, ConvMode::Valid).unwrap();

    // Each tap contributes ch0 - ch1 = -1.
    assert_eq!((out.rows(), out.cols()), (1, 1));
    assert_eq!(out.get(0, 0, 0), -9);
}

#[test]
fn test_conv_rejects_too_many_output_channels() {
    let input = Volume::<i8>::zeros(4, 4, 1);
    let filter = FilterBank::from_fn(1, 1, 17, |_, _, _, _| 1);

    assert!(matches!(
        conv_tiles(&mut ScalarTiles::new(), &input, &filter, ConvMode::Valid),
        Err(TileError::InvalidShape { .. })
    ));
}

// ============================================================
// Demo programs
// ============================================================

#[test]
fn test_permission_denied_stops_before_numeric_work() {
    let mut out = Vec::new();

    let result = demo::run(
        Demo::Bf16Mul,
        &mut out,
        Err(TileError::PermissionDenied { errno: 22 }),
    );

    assert!(matches!(result, Err(TileError::PermissionDenied { errno: 22 })));
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, PERMISSION_FAILURE);
    assert!(!text.contains(NAIVE_DIVIDER));
}

#[test]
fn test_demo_blocks_agree() {
    for d in [Demo::Bf16Mul, Demo::Int8Mul, Demo::Int8Mul8x8] {
        let mut out = Vec::new();
        demo::run(d, &mut out, Ok(Box::new(ScalarTiles::new()))).unwrap();

        let text = String::from_utf8(out).unwrap();
        let (naive, amx) = text.split_once(AMX_DIVIDER).unwrap();
        let naive = naive.strip_prefix(NAIVE_DIVIDER).unwrap();
        assert_eq!(naive, amx, "{:?}", d);

        let rows = amx.trim_start_matches('\n').lines().count();
        let expected_rows = if d == Demo::Int8Mul8x8 { 8 } else { 16 };
        assert_eq!(rows, expected_rows, "{:?}", d);
    }
}

#[test]
fn test_bf16_demo_prints_corner_value() {
    let mut out = Vec::new();
    demo::run(Demo::Bf16Mul, &mut out, Ok(Box::new(ScalarTiles::new()))).unwrap();

    let text = String::from_utf8(out).unwrap();
    let first_row = text.lines().nth(1).unwrap();
    assert!(first_row.starts_with("2604.000000 "));
}

#[test]
fn test_conv_demo_prints_valid_rows() {
    let mut out = Vec::new();
    demo::run(
        Demo::Int8Conv(ConvMode::Valid),
        &mut out,
        Ok(Box::new(ScalarTiles::new())),
    )
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 2 + 2 * 158);
    let first_row = text.lines().nth(1).unwrap();
    assert_eq!(first_row.matches("; ").count(), 158);
}

// ============================================================
// Hardware engine (skipped without AMX)
// ============================================================

#[test]
fn test_hardware_matches_scalar_gemm() {
    let Some(mut hw) = hardware_engine() else { return };

    let (a, b) = demo::bf16_operands(BF16_SHAPE);
    let hw_c = matmul_tiles_f32(hw.as_mut(), &a, &b).unwrap();
    let sw_c = matmul_tiles_f32(&mut ScalarTiles::new(), &a, &b).unwrap();
    assert_matrices_equal(&sw_c, &hw_c, "bf16 hardware");

    for shape in [INT8_SHAPE, INT8_SHAPE_8X8] {
        let (a, b) = demo::int8_operands(shape);
        let hw_c = matmul_tiles_i8(hw.as_mut(), &a, &b).unwrap();
        assert_eq!(hw_c, matmul_naive_i8(&a, &b), "{:?}", shape);
    }
    hw.release();
}

#[test]
fn test_hardware_conv_matches_naive() {
    let Some(mut hw) = hardware_engine() else { return };

    let input = conv::demo_input();
    let filter = conv::demo_filter();
    for mode in [ConvMode::Valid, ConvMode::FullExtent] {
        let actual = conv_tiles(hw.as_mut(), &input, &filter, mode).unwrap();
        assert!(actual == conv_naive(&input, &filter, mode).unwrap(), "{:?}", mode);
    }
    hw.release();
}
