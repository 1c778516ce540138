//! Multi-channel 2D convolution: naive reference and tile version.
//!
//! Layouts are channel-innermost: the input is `[rows][cols][in_ch]` i8,
//! the filter bank `[in_ch][fr][fc][out_ch]` i8, and the output
//! `[rows][cols][out_ch]` i32.
//!
//! Which output positions exist depends on [`ConvMode`].

pub mod naive;
pub mod tiles;

pub use naive::conv_naive;
pub use tiles::{TransformedFilter, conv_tiles, transform_filter};

use crate::error::{Result, TileError};

pub const CONV_INPUT_ROWS: usize = 160;
pub const CONV_INPUT_COLS: usize = 160;
pub const CONV_INPUT_CH: usize = 3;
pub const CONV_OUTPUT_CH: usize = 6;
pub const CONV_FILTER_SIZE: usize = 3;

/// Which output positions a convolution produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvMode {
    /// Only positions where the filter window lies fully inside the input:
    /// `(rows - f + 1) × (cols - f + 1)` outputs.
    Valid,
    /// One output per input position, window anchored at its top-left
    /// corner. Taps past the bottom or right edge read as zero.
    FullExtent,
}

impl ConvMode {
    /// Output rows and columns for an input of `rows × cols` and an
    /// `f × f` filter.
    pub fn output_extent(self, rows: usize, cols: usize, f: usize) -> (usize, usize) {
        match self {
            ConvMode::Valid => (
                rows.saturating_sub(f.saturating_sub(1)),
                cols.saturating_sub(f.saturating_sub(1)),
            ),
            ConvMode::FullExtent => (rows, cols),
        }
    }
}

/// A `rows × cols × ch` volume, channel innermost.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    rows: usize,
    cols: usize,
    ch: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Volume<T> {
    pub fn zeros(rows: usize, cols: usize, ch: usize) -> Self {
        Self {
            rows,
            cols,
            ch,
            data: vec![T::default(); rows * cols * ch],
        }
    }

    pub fn from_fn(
        rows: usize,
        cols: usize,
        ch: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut data = Vec::with_capacity(rows * cols * ch);
        for r in 0..rows {
            for c in 0..cols {
                for k in 0..ch {
                    data.push(f(r, c, k));
                }
            }
        }
        Self { rows, cols, ch, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn channels(&self) -> usize {
        self.ch
    }

    pub fn get(&self, r: usize, c: usize, k: usize) -> T {
        self.data[(r * self.cols + c) * self.ch + k]
    }

    /// Like [`get`](Self::get) but `None` outside the volume.
    pub fn get_checked(&self, r: usize, c: usize, k: usize) -> Option<T> {
        if r < self.rows && c < self.cols && k < self.ch {
            Some(self.get(r, c, k))
        } else {
            None
        }
    }

    pub fn set(&mut self, r: usize, c: usize, k: usize, value: T) {
        self.data[(r * self.cols + c) * self.ch + k] = value;
    }

    /// All channels of one position.
    pub fn pixel(&self, r: usize, c: usize) -> &[T] {
        let at = (r * self.cols + c) * self.ch;
        &self.data[at..at + self.ch]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

/// Filter weights indexed `[in_ch][fr][fc][out_ch]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    size: usize,
    in_ch: usize,
    out_ch: usize,
    data: Vec<i8>,
}

impl FilterBank {
    pub fn from_fn(
        size: usize,
        in_ch: usize,
        out_ch: usize,
        mut f: impl FnMut(usize, usize, usize, usize) -> i8,
    ) -> Self {
        let mut data = Vec::with_capacity(in_ch * size * size * out_ch);
        for ic in 0..in_ch {
            for fr in 0..size {
                for fc in 0..size {
                    for oc in 0..out_ch {
                        data.push(f(ic, fr, fc, oc));
                    }
                }
            }
        }
        Self { size, in_ch, out_ch, data }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_channels(&self) -> usize {
        self.in_ch
    }

    pub fn out_channels(&self) -> usize {
        self.out_ch
    }

    pub fn get(&self, ic: usize, fr: usize, fc: usize, oc: usize) -> i8 {
        self.data[((ic * self.size + fr) * self.size + fc) * self.out_ch + oc]
    }
}

/// Check that `filter` can slide over `input`.
pub(crate) fn check_conv_dims(input: &Volume<i8>, filter: &FilterBank) -> Result<()> {
    if input.channels() != filter.in_channels() {
        return Err(TileError::Dimension {
            expected: format!("{} input channels", filter.in_channels()),
            actual: format!("{} input channels", input.channels()),
        });
    }
    if filter.size() == 0 || filter.size() > input.rows() || filter.size() > input.cols() {
        return Err(TileError::Dimension {
            expected: format!("input of at least {0}x{0}", filter.size().max(1)),
            actual: format!("{}x{}", input.rows(), input.cols()),
        });
    }
    Ok(())
}

/// The demo input: `in[r][c][ic] = r - c + ic`, wrapped to i8.
pub fn demo_input() -> Volume<i8> {
    Volume::from_fn(CONV_INPUT_ROWS, CONV_INPUT_COLS, CONV_INPUT_CH, |r, c, ic| {
        (r as i32 - c as i32 + ic as i32) as i8
    })
}

/// The demo filter: `f[ic][fr][fc][oc] = ic + fr - fc - oc`.
pub fn demo_filter() -> FilterBank {
    FilterBank::from_fn(CONV_FILTER_SIZE, CONV_INPUT_CH, CONV_OUTPUT_CH, |ic, fr, fc, oc| {
        (ic as i32 + fr as i32 - fc as i32 - oc as i32) as i8
    })
}
