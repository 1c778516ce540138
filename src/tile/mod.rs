//! AMX tile register file: configuration, engines and the OS permission.
//!
//! Two engines implement [`TileEngine`]:
//! - `AmxTiles`: real `ldtilecfg`/`tileloadd`/`tdp*`/`tilestored` via `asm!`
//! - `ScalarTiles`: the same register file emulated in software
//!
//! [`acquire`] picks the hardware engine when CPUID reports AMX and the
//! kernel grants tile-data permission, and falls back to emulation when the
//! CPU has no AMX at all.

#[cfg(target_arch = "x86_64")]
pub mod amx;
pub mod config;
pub mod engine;
pub mod permission;
pub mod scalar;

pub use config::{GemmShape, TileConfig, TileShape};
pub use engine::{DotProduct, TileEngine};
pub use scalar::ScalarTiles;

use crate::error::Result;

/// Rows in one tile register (palette 1).
pub const MAX_ROWS: usize = 16;

/// Bytes per tile row (palette 1).
pub const MAX_COLSB: usize = 64;

/// Number of tile registers.
pub const NUM_TILES: usize = 8;

/// The eight tile registers, `tmm0` to `tmm7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileSlot {
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
}

impl TileSlot {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Slot holding the accumulator in every kernel of this crate.
pub const ACC: TileSlot = TileSlot::T0;
/// Slot holding the left operand (A).
pub const LHS: TileSlot = TileSlot::T1;
/// Slot holding the interleaved right operand (B).
pub const RHS: TileSlot = TileSlot::T2;

/// Pick the fastest available engine.
///
/// On a CPU with AMX-TILE, AMX-BF16 and AMX-INT8 this asks the kernel for
/// tile-data permission first; a refusal is returned as
/// [`TileError::PermissionDenied`](crate::error::TileError::PermissionDenied)
/// and is fatal for the demos. Without AMX, tiles are emulated.
pub fn acquire() -> Result<Box<dyn TileEngine>> {
    #[cfg(target_arch = "x86_64")]
    {
        if amx::AmxTiles::is_supported() {
            permission::request_tile_data()?;
            tracing::info!("using AMX tile engine");
            return Ok(Box::new(amx::AmxTiles::new()?));
        }
    }

    tracing::warn!("AMX not available on this CPU, emulating tiles in software");
    Ok(Box::new(ScalarTiles::new()))
}
