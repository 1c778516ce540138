//! Naive loops vs tile kernels, on the emulated engine and on AMX when present.

use amxmul::conv::{self, ConvMode};
use amxmul::demo::{bf16_operands, int8_operands};
use amxmul::kernels::{BF16_SHAPE, INT8_SHAPE, matmul_tiles_f32, matmul_tiles_i8};
use amxmul::matrix::naive::{matmul_naive_f32, matmul_naive_i8};
use amxmul::tile::{ScalarTiles, TileEngine};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn engines() -> Vec<(&'static str, Box<dyn TileEngine>)> {
    let mut engines: Vec<(&'static str, Box<dyn TileEngine>)> =
        vec![("scalar tiles", Box::new(ScalarTiles::new()))];

    #[cfg(target_arch = "x86_64")]
    {
        use amxmul::tile::amx::AmxTiles;
        use amxmul::tile::permission::request_tile_data;

        if AmxTiles::is_supported() && request_tile_data().is_ok() {
            if let Ok(hw) = AmxTiles::new() {
                engines.push(("amx tiles", Box::new(hw)));
            }
        }
    }
    engines
}

fn bench_gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm_16x16x32");

    let (a, b) = bf16_operands(BF16_SHAPE);
    group.bench_function("bf16 naive", |bench| {
        bench.iter(|| matmul_naive_f32(black_box(&a), black_box(&b)))
    });
    for (name, mut engine) in engines() {
        group.bench_function(format!("bf16 {}", name), |bench| {
            bench.iter(|| matmul_tiles_f32(engine.as_mut(), black_box(&a), black_box(&b)))
        });
        engine.release();
    }

    let (a, b) = int8_operands(INT8_SHAPE);
    group.bench_function("int8 naive", |bench| {
        bench.iter(|| matmul_naive_i8(black_box(&a), black_box(&b)))
    });
    for (name, mut engine) in engines() {
        group.bench_function(format!("int8 {}", name), |bench| {
            bench.iter(|| matmul_tiles_i8(engine.as_mut(), black_box(&a), black_box(&b)))
        });
        engine.release();
    }

    group.finish();
}

fn bench_conv(c: &mut Criterion) {
    let mut group = c.benchmark_group("conv_160x160x3_3x3x6");
    group.sample_size(10);

    let input = conv::demo_input();
    let filter = conv::demo_filter();
    group.bench_function("naive", |bench| {
        bench.iter(|| conv::conv_naive(black_box(&input), &filter, ConvMode::Valid))
    });
    for (name, mut engine) in engines() {
        group.bench_function(name, |bench| {
            bench.iter(|| conv::conv_tiles(engine.as_mut(), black_box(&input), &filter, ConvMode::Valid))
        });
        engine.release();
    }

    group.finish();
}

criterion_group!(benches, bench_gemm, bench_conv);
criterion_main!(benches);
