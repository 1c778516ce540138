//! The tile engine interface and the checks every engine runs first.
//!
//! The hardware raises #UD or #GP on a mismatched multiply or a bad
//! configuration, so each engine validates through the helpers here before
//! touching a register. After that, hardware and emulation see the same
//! preconditions and must produce the same bytes.

use super::{TileConfig, TileShape, TileSlot};
use crate::error::{Result, TileError};

/// Which tile dot-product instruction to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotProduct {
    /// `tdpbf16ps`: pairs of bf16 products accumulated into f32.
    Bf16ToF32,
    /// `tdpbssd`: quads of signed i8 products accumulated into i32.
    Int8ToI32,
}

/// A register file of eight configurable tiles.
pub trait TileEngine {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Install a configuration; every tile is zeroed.
    fn configure(&mut self, config: &TileConfig) -> Result<()>;

    /// Load `slot` from `src`, rows `stride` bytes apart.
    fn load(&mut self, slot: TileSlot, src: &[u8], stride: usize) -> Result<()>;

    /// Zero every byte of `slot`.
    fn zero(&mut self, slot: TileSlot) -> Result<()>;

    /// `dst += lhs · rhs` with the given dot-product semantics.
    fn multiply_accumulate(
        &mut self,
        op: DotProduct,
        dst: TileSlot,
        lhs: TileSlot,
        rhs: TileSlot,
    ) -> Result<()>;

    /// Store `slot` into `dst`, rows `stride` bytes apart.
    fn store(&mut self, slot: TileSlot, dst: &mut [u8], stride: usize) -> Result<()>;

    /// Drop the configuration and clear all tiles.
    fn release(&mut self);
}

/// Shape of a configured slot, rejecting unconfigured engines and unused slots.
pub(crate) fn used_shape(config: Option<&TileConfig>, slot: TileSlot) -> Result<TileShape> {
    let config = config.ok_or(TileError::NotConfigured)?;
    let shape = config.shape(slot);
    if shape.is_unused() {
        return Err(TileError::SlotUnused(slot));
    }
    Ok(shape)
}

/// Check that a load or store of `slot` stays inside a `len`-byte buffer.
pub(crate) fn check_access(
    config: Option<&TileConfig>,
    slot: TileSlot,
    len: usize,
    stride: usize,
) -> Result<TileShape> {
    let shape = used_shape(config, slot)?;
    let needed = shape.span(stride);
    if needed > len {
        return Err(TileError::BufferTooSmall { slot, needed, len });
    }
    Ok(shape)
}

/// Check the tile shapes of `dst += lhs · rhs`.
///
/// With K groups of 4 bytes per row in `lhs`: `lhs` is M × 4K, `rhs` is
/// K × 4N and `dst` is M × 4N. The three slots must be distinct.
pub(crate) fn check_dot(
    config: Option<&TileConfig>,
    dst: TileSlot,
    lhs: TileSlot,
    rhs: TileSlot,
) -> Result<(TileShape, TileShape, TileShape)> {
    let d = used_shape(config, dst)?;
    let a = used_shape(config, lhs)?;
    let b = used_shape(config, rhs)?;

    if dst == lhs || dst == rhs || lhs == rhs {
        return Err(TileError::ShapeMismatch(format!(
            "dst {:?}, lhs {:?} and rhs {:?} must be different tiles",
            dst, lhs, rhs
        )));
    }
    if d.colsb % 4 != 0 || a.colsb % 4 != 0 || b.colsb % 4 != 0 {
        return Err(TileError::ShapeMismatch(
            "every operand row must hold whole 4-byte groups".to_string(),
        ));
    }
    if d.rows != a.rows {
        return Err(TileError::ShapeMismatch(format!(
            "dst has {} rows, lhs has {}",
            d.rows, a.rows
        )));
    }
    if a.colsb / 4 != b.rows {
        return Err(TileError::ShapeMismatch(format!(
            "lhs holds {} groups per row, rhs has {} rows",
            a.colsb / 4,
            b.rows
        )));
    }
    if d.colsb != b.colsb {
        return Err(TileError::ShapeMismatch(format!(
            "dst rows are {} bytes, rhs rows are {}",
            d.colsb, b.colsb
        )));
    }
    Ok((d, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::GemmShape;

    #[test]
    fn test_unconfigured_is_rejected() {
        assert!(matches!(
            used_shape(None, TileSlot::T0),
            Err(TileError::NotConfigured)
        ));
    }

    #[test]
    fn test_access_span_is_checked() {
        let config = GemmShape::new(16, 16, 32).tile_config(2).unwrap();
        assert!(check_access(Some(&config), TileSlot::T1, 1024, 64).is_ok());
        assert!(matches!(
            check_access(Some(&config), TileSlot::T1, 1023, 64),
            Err(TileError::BufferTooSmall { needed: 1024, .. })
        ));
        assert!(matches!(
            check_access(Some(&config), TileSlot::T5, 4096, 64),
            Err(TileError::SlotUnused(TileSlot::T5))
        ));
    }

    #[test]
    fn test_dot_shapes() {
        let config = GemmShape::new(16, 16, 32).tile_config(1).unwrap();
        assert!(check_dot(Some(&config), TileSlot::T0, TileSlot::T1, TileSlot::T2).is_ok());
        // Swapping the operands breaks the K dimension.
        assert!(check_dot(Some(&config), TileSlot::T0, TileSlot::T2, TileSlot::T1).is_err());
        assert!(check_dot(Some(&config), TileSlot::T0, TileSlot::T0, TileSlot::T2).is_err());
    }
}
