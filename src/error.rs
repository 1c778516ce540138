//! Error type shared by the tile engines, layouts and demos.

use crate::tile::TileSlot;

/// Everything that can go wrong between building operands and storing a tile.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("arch_prctl(ARCH_REQ_XCOMP_PERM, XFEATURE_XTILEDATA) failed (errno {errno})")]
    PermissionDenied { errno: i32 },

    #[error("tile engine unavailable: {0}")]
    Unsupported(&'static str),

    #[error("tile engine used before configure() or after release()")]
    NotConfigured,

    #[error("{slot:?}: {rows} rows x {colsb} bytes does not fit a palette 1 tile")]
    InvalidShape { slot: TileSlot, rows: usize, colsb: usize },

    #[error("{0:?} has no rows or columns in the active configuration")]
    SlotUnused(TileSlot),

    #[error("{slot:?}: buffer holds {len} bytes, tile access needs {needed}")]
    BufferTooSmall { slot: TileSlot, needed: usize, len: usize },

    #[error("tile shapes do not line up: {0}")]
    ShapeMismatch(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: String, actual: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TileError>;
