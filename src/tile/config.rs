//! The 64-byte tile configuration block loaded by `ldtilecfg`.

use bytemuck::{Pod, Zeroable};

use super::{ACC, LHS, MAX_COLSB, MAX_ROWS, NUM_TILES, RHS, TileSlot};
use crate::error::{Result, TileError};

/// Palette 1 tile configuration, laid out exactly as `ldtilecfg` reads it.
///
/// ```text
/// byte  0       palette_id
/// byte  1       start_row
/// bytes 2-15    reserved, zero
/// bytes 16-31   colsb[8]  (u16, bytes per row)
/// bytes 32-47   reserved, zero
/// bytes 48-55   rows[8]
/// bytes 56-63   reserved, zero
/// ```
#[repr(C, align(64))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct TileConfig {
    palette_id: u8,
    start_row: u8,
    reserved_0: [u8; 14],
    colsb: [u16; NUM_TILES],
    reserved_1: [u8; 16],
    rows: [u8; NUM_TILES],
    reserved_2: [u8; 8],
}

/// Geometry of one tile: row count and bytes per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileShape {
    pub rows: usize,
    pub colsb: usize,
}

impl TileShape {
    pub const fn new(rows: usize, colsb: usize) -> Self {
        Self { rows, colsb }
    }

    pub fn is_unused(&self) -> bool {
        self.rows == 0 && self.colsb == 0
    }

    /// Bytes a load or store with `stride` touches, first byte to last.
    pub fn span(&self, stride: usize) -> usize {
        if self.rows == 0 {
            0
        } else {
            (self.rows - 1) * stride + self.colsb
        }
    }
}

impl TileConfig {
    /// Empty palette 1 configuration: every slot unused.
    pub fn new() -> Self {
        Self {
            palette_id: 1,
            ..Zeroable::zeroed()
        }
    }

    /// Set the geometry of `slot`.
    ///
    /// Rows are limited to 16 and bytes per row to 64. A slot is either
    /// fully unused (0 × 0) or has both dimensions set.
    pub fn set(&mut self, slot: TileSlot, shape: TileShape) -> Result<&mut Self> {
        let half_set = (shape.rows == 0) != (shape.colsb == 0);
        if shape.rows > MAX_ROWS || shape.colsb > MAX_COLSB || half_set {
            return Err(TileError::InvalidShape {
                slot,
                rows: shape.rows,
                colsb: shape.colsb,
            });
        }
        self.rows[slot.index()] = shape.rows as u8;
        self.colsb[slot.index()] = shape.colsb as u16;
        Ok(self)
    }

    pub fn shape(&self, slot: TileSlot) -> TileShape {
        TileShape {
            rows: self.rows[slot.index()] as usize,
            colsb: self.colsb[slot.index()] as usize,
        }
    }

    /// The 64 bytes handed to `ldtilecfg`.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Logical shape of one tile multiply: C (m × n) += A (m × k) · B (k × n).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmShape {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl GemmShape {
    pub const fn new(m: usize, n: usize, k: usize) -> Self {
        Self { m, n, k }
    }

    /// Configuration for operands `elem_bytes` wide with 32-bit accumulators.
    ///
    /// ACC holds C (m rows × n·4 bytes), LHS holds A (m × k·W) and RHS holds
    /// the interleaved B (k·W/4 rows × n·4 bytes).
    pub fn tile_config(&self, elem_bytes: usize) -> Result<TileConfig> {
        let a_colsb = self.k * elem_bytes;
        if !matches!(elem_bytes, 1 | 2) || a_colsb % 4 != 0 {
            return Err(TileError::ShapeMismatch(format!(
                "k={} with {}-byte elements does not fill whole 4-byte groups",
                self.k, elem_bytes
            )));
        }

        let mut config = TileConfig::new();
        config
            .set(ACC, TileShape::new(self.m, self.n * 4))?
            .set(LHS, TileShape::new(self.m, a_colsb))?
            .set(RHS, TileShape::new(a_colsb / 4, self.n * 4))?;
        Ok(config)
    }
}
