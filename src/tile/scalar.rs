//! Software emulation of the AMX register file.
//!
//! Each tile is 16 rows of 64 bytes. Loads fill the configured rows and
//! bytes and leave the rest zero, like `tileloadd`. The dot products follow
//! Intel's pseudocode for `tdpbf16ps` and `tdpbssd` element by element,
//! including the bf16 unit's fixed DAZ/FTZ mode: subnormal inputs read as
//! zero and subnormal sums are flushed to zero.

use half::bf16;

use super::engine::{self, DotProduct, TileEngine};
use super::{MAX_COLSB, MAX_ROWS, NUM_TILES, TileConfig, TileSlot};
use crate::error::Result;
use crate::matrix::bf16::bf16_to_fp32;

const TILE_BYTES: usize = MAX_ROWS * MAX_COLSB;

/// Tile engine that runs anywhere.
pub struct ScalarTiles {
    config: Option<TileConfig>,
    tiles: Box<[[u8; TILE_BYTES]; NUM_TILES]>,
}

impl ScalarTiles {
    pub fn new() -> Self {
        Self {
            config: None,
            tiles: Box::new([[0; TILE_BYTES]; NUM_TILES]),
        }
    }

    fn dword(&self, slot: TileSlot, row: usize, group: usize) -> [u8; 4] {
        let at = row * MAX_COLSB + group * 4;
        let t = &self.tiles[slot.index()];
        [t[at], t[at + 1], t[at + 2], t[at + 3]]
    }

    fn set_dword(&mut self, slot: TileSlot, row: usize, group: usize, bytes: [u8; 4]) {
        let at = row * MAX_COLSB + group * 4;
        self.tiles[slot.index()][at..at + 4].copy_from_slice(&bytes);
    }
}

/// Subnormals become zero of the same sign.
fn flush_subnormal(x: f32) -> f32 {
    if x.is_subnormal() { 0.0f32.copysign(x) } else { x }
}

impl Default for ScalarTiles {
    fn default() -> Self {
        Self::new()
    }
}

impl TileEngine for ScalarTiles {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn configure(&mut self, config: &TileConfig) -> Result<()> {
        tracing::debug!("scalar tiles: configure {:?}", config);
        self.config = Some(*config);
        self.tiles.iter_mut().for_each(|t| t.fill(0));
        Ok(())
    }

    fn load(&mut self, slot: TileSlot, src: &[u8], stride: usize) -> Result<()> {
        let shape = engine::check_access(self.config.as_ref(), slot, src.len(), stride)?;

        let tile = &mut self.tiles[slot.index()];
        tile.fill(0);
        for r in 0..shape.rows {
            let from = r * stride;
            tile[r * MAX_COLSB..r * MAX_COLSB + shape.colsb]
                .copy_from_slice(&src[from..from + shape.colsb]);
        }
        Ok(())
    }

    fn zero(&mut self, slot: TileSlot) -> Result<()> {
        engine::used_shape(self.config.as_ref(), slot)?;
        self.tiles[slot.index()].fill(0);
        Ok(())
    }

    fn multiply_accumulate(
        &mut self,
        op: DotProduct,
        dst: TileSlot,
        lhs: TileSlot,
        rhs: TileSlot,
    ) -> Result<()> {
        let (d, a, _) = engine::check_dot(self.config.as_ref(), dst, lhs, rhs)?;
        let (m_rows, k_groups, n_cols) = (d.rows, a.colsb / 4, d.colsb / 4);

        for m in 0..m_rows {
            for n in 0..n_cols {
                let acc = self.dword(dst, m, n);
                let out = match op {
                    DotProduct::Bf16ToF32 => {
                        let mut acc = flush_subnormal(f32::from_ne_bytes(acc));
                        for k in 0..k_groups {
                            let x = self.dword(lhs, m, k);
                            let y = self.dword(rhs, k, n);
                            for i in 0..2 {
                                let xa = bf16::from_bits(u16::from_ne_bytes([x[2 * i], x[2 * i + 1]]));
                                let yb = bf16::from_bits(u16::from_ne_bytes([y[2 * i], y[2 * i + 1]]));
                                let xa = flush_subnormal(bf16_to_fp32(xa));
                                let yb = flush_subnormal(bf16_to_fp32(yb));
                                acc = flush_subnormal(acc + xa * yb);
                            }
                        }
                        acc.to_ne_bytes()
                    }
                    DotProduct::Int8ToI32 => {
                        let mut acc = i32::from_ne_bytes(acc);
                        for k in 0..k_groups {
                            let x = self.dword(lhs, m, k);
                            let y = self.dword(rhs, k, n);
                            for i in 0..4 {
                                let p = (x[i] as i8 as i32) * (y[i] as i8 as i32);
                                acc = acc.wrapping_add(p);
                            }
                        }
                        acc.to_ne_bytes()
                    }
                };
                self.set_dword(dst, m, n, out);
            }
        }
        Ok(())
    }

    fn store(&mut self, slot: TileSlot, dst: &mut [u8], stride: usize) -> Result<()> {
        let shape = engine::check_access(self.config.as_ref(), slot, dst.len(), stride)?;

        let tile = &self.tiles[slot.index()];
        for r in 0..shape.rows {
            let to = r * stride;
            dst[to..to + shape.colsb]
                .copy_from_slice(&tile[r * MAX_COLSB..r * MAX_COLSB + shape.colsb]);
        }
        Ok(())
    }

    fn release(&mut self) {
        self.config = None;
        self.tiles.iter_mut().for_each(|t| t.fill(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TileError;
    use crate::tile::{ACC, GemmShape, LHS, RHS, TileShape};

    #[test]
    fn test_load_store_roundtrip_with_stride() {
        let mut config = TileConfig::new();
        config.set(TileSlot::T3, TileShape::new(2, 4)).unwrap();
        let mut tiles = ScalarTiles::new();
        tiles.configure(&config).unwrap();

        let src: Vec<u8> = (0..16).collect();
        tiles.load(TileSlot::T3, &src, 8).unwrap();

        let mut out = [0xFFu8; 8];
        tiles.store(TileSlot::T3, &mut out, 4).unwrap();
        assert_eq!(out, [0, 1, 2, 3, 8, 9, 10, 11]);
    }

    #[test]
    fn test_int8_dot_of_one_group() {
        let config = GemmShape::new(1, 1, 4).tile_config(1).unwrap();
        let mut tiles = ScalarTiles::new();
        tiles.configure(&config).unwrap();

        let a = [1i8, -2, 3, -4];
        let b = [5i8, 6, -7, 8];
        tiles.load(LHS, bytemuck::cast_slice(&a), 4).unwrap();
        tiles.load(RHS, bytemuck::cast_slice(&b), 4).unwrap();
        tiles.zero(ACC).unwrap();
        tiles
            .multiply_accumulate(DotProduct::Int8ToI32, ACC, LHS, RHS)
            .unwrap();
        tiles
            .multiply_accumulate(DotProduct::Int8ToI32, ACC, LHS, RHS)
            .unwrap();

        let mut c = [0i32; 1];
        tiles.store(ACC, bytemuck::cast_slice_mut(&mut c), 4).unwrap();
        assert_eq!(c[0], 2 * (5 - 12 - 21 - 32));
    }

    fn bf16_dot(a: [u16; 2], b: [u16; 2]) -> u32 {
        let config = GemmShape::new(1, 1, 2).tile_config(2).unwrap();
        let mut tiles = ScalarTiles::new();
        tiles.configure(&config).unwrap();
        tiles.load(LHS, bytemuck::cast_slice(&a), 4).unwrap();
        tiles.load(RHS, bytemuck::cast_slice(&b), 4).unwrap();
        tiles.zero(ACC).unwrap();
        tiles
            .multiply_accumulate(DotProduct::Bf16ToF32, ACC, LHS, RHS)
            .unwrap();

        let mut c = [0u32; 1];
        tiles.store(ACC, bytemuck::cast_slice_mut(&mut c), 4).unwrap();
        c[0]
    }

    #[test]
    fn test_bf16_subnormal_input_reads_as_zero() {
        // bf16 0x0001 is the smallest subnormal; 0x3F80 is 1.0.
        assert_eq!(bf16_dot([0x0001, 0], [0x3F80, 0]), 0);
        // -0.0 added to the zeroed accumulator leaves +0.0.
        assert_eq!(bf16_dot([0x8001, 0], [0x3F80, 0]), 0);
    }

    #[test]
    fn test_bf16_subnormal_product_is_flushed() {
        // 2^-125 * 0.25 = 2^-127, below f32::MIN_POSITIVE.
        assert_eq!(bf16_dot([0x0100, 0], [0x3E80, 0]), 0);
        // 2^-125 * 2.0 stays normal.
        assert_eq!(bf16_dot([0x0100, 0], [0x4000, 0]), 0x0180_0000);
    }

    #[test]
    fn test_release_forgets_configuration() {
        let config = GemmShape::new(16, 16, 32).tile_config(2).unwrap();
        let mut tiles = ScalarTiles::new();
        tiles.configure(&config).unwrap();
        tiles.release();

        assert!(matches!(tiles.zero(ACC), Err(TileError::NotConfigured)));
    }
}
