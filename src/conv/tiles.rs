//! Convolution as a sequence of tile multiplies.
//!
//! For one filter row `fr`, the window taps of an output pixel form a row
//! of K = f · in_ch input bytes (`fc` major, `ic` minor). Sixteen pixels of
//! one output row stacked together give a 16 × K patch, and the matching
//! weights form a K × out_ch matrix. Multiplying the two for every filter
//! row and accumulating in one tile yields 16 output pixels.
//!
//! K is padded with zeros to a multiple of 4 so the patch rows fill whole
//! 4-byte groups.

use super::{ConvMode, FilterBank, Volume, check_conv_dims};
use crate::error::Result;
use crate::matrix::Matrix;
use crate::matrix::repack::interleave;
use crate::tile::{ACC, DotProduct, GemmShape, LHS, MAX_ROWS, RHS, TileEngine};

/// Filter weights in tile layout: one interleaved matrix per filter row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedFilter {
    k_padded: usize,
    rows: Vec<Matrix<i8>>,
}

impl TransformedFilter {
    /// Window length per filter row, rounded up to a multiple of 4.
    pub fn k_padded(&self) -> usize {
        self.k_padded
    }

    /// The `(k_padded / 4) × (out_ch · 4)` matrix for filter row `fr`.
    ///
    /// # Panics
    ///
    /// Panics if `fr` is not below the filter size.
    pub fn row(&self, fr: usize) -> &Matrix<i8> {
        &self.rows[fr]
    }
}

/// Rearrange `filter` for the tile unit.
///
/// Entry `[fr][r2 / 4][oc · 4 + r2 % 4]` holds `f[ic][fr][fc][oc]` with
/// `r2 = fc · in_ch + ic`; rows past K are zero.
pub fn transform_filter(filter: &FilterBank) -> Result<TransformedFilter> {
    let k = filter.size() * filter.in_channels();
    let k_padded = k.div_ceil(4) * 4;

    let rows = (0..filter.size())
        .map(|fr| {
            let b = Matrix::from_fn(k_padded, filter.out_channels(), |r2, oc| {
                if r2 < k {
                    let (fc, ic) = (r2 / filter.in_channels(), r2 % filter.in_channels());
                    filter.get(ic, fr, fc, oc)
                } else {
                    0
                }
            });
            interleave(&b)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TransformedFilter { k_padded, rows })
}

/// Convolve on the tile engine; matches [`conv_naive`](super::conv_naive)
/// exactly for the same `mode`.
///
/// Needs `out_ch ≤ 16` and `f · in_ch ≤ 64`.
pub fn conv_tiles(
    engine: &mut dyn TileEngine,
    input: &Volume<i8>,
    filter: &FilterBank,
    mode: ConvMode,
) -> Result<Volume<i32>> {
    check_conv_dims(input, filter)?;
    let tfilter = transform_filter(filter)?;

    let f = filter.size();
    let out_ch = filter.out_channels();
    let (out_rows, out_cols) = mode.output_extent(input.rows(), input.cols(), f);

    let shape = GemmShape::new(MAX_ROWS, out_ch, tfilter.k_padded());
    engine.configure(&shape.tile_config(1)?)?;
    tracing::debug!(
        "{} engine: conv {}x{} -> {}x{}x{} ({:?})",
        engine.name(),
        input.rows(),
        input.cols(),
        out_rows,
        out_cols,
        out_ch,
        mode
    );

    let mut output = Volume::zeros(out_rows, out_cols, out_ch);
    let mut patch = Matrix::<i8>::zeros(MAX_ROWS, tfilter.k_padded());
    let mut acc = Matrix::<i32>::zeros(MAX_ROWS, out_ch);

    for r in 0..out_rows {
        for c0 in (0..out_cols).step_by(MAX_ROWS) {
            let width = (out_cols - c0).min(MAX_ROWS);

            engine.zero(ACC)?;
            for fr in 0..f {
                fill_patch(&mut patch, input, f, r + fr, c0, width);
                engine.load(LHS, patch.as_bytes(), patch.stride_bytes())?;
                let weights = tfilter.row(fr);
                engine.load(RHS, weights.as_bytes(), weights.stride_bytes())?;
                engine.multiply_accumulate(DotProduct::Int8ToI32, ACC, LHS, RHS)?;
            }

            let stride = acc.stride_bytes();
            engine.store(ACC, acc.as_bytes_mut(), stride)?;
            for m in 0..width {
                for oc in 0..out_ch {
                    output.set(r, c0 + m, oc, acc[(m, oc)]);
                }
            }
        }
    }
    Ok(output)
}

// Row m of the patch holds the window of output pixel c0 + m for input row
// `row`. Rows past `width`, padding columns and taps off the input are zero.
fn fill_patch(
    patch: &mut Matrix<i8>,
    input: &Volume<i8>,
    f: usize,
    row: usize,
    c0: usize,
    width: usize,
) {
    let ch = input.channels();
    patch.as_mut_slice().fill(0);
    for m in 0..width {
        for fc in 0..f {
            for ic in 0..ch {
                if let Some(x) = input.get_checked(row, c0 + m + fc, ic) {
                    patch[(m, fc * ch + ic)] = x;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::{conv_naive, demo_filter};
    use crate::tile::ScalarTiles;

    #[test]
    fn test_transform_filter_layout() {
        let filter = demo_filter();
        let t = transform_filter(&filter).unwrap();

        assert_eq!(t.k_padded(), 12);
        let row = t.row(1);
        assert_eq!((row.rows(), row.cols()), (3, 24));

        // r2 = fc·3 + ic; (fc=1, ic=2) -> r2 = 5 -> [1][oc·4 + 1]
        for oc in 0..6 {
            assert_eq!(row[(1, oc * 4 + 1)], filter.get(2, 1, 1, oc));
        }
        // r2 = 9..12 is padding.
        for oc in 0..6 {
            assert_eq!(row[(2, oc * 4 + 1)], 0);
            assert_eq!(row[(2, oc * 4 + 3)], 0);
        }
    }

    #[test]
    fn test_small_volume_matches_naive_in_both_modes() {
        let input = Volume::from_fn(9, 21, 3, |r, c, ic| (r * 7 + c * 3 + ic) as i8);
        let filter = demo_filter();

        for mode in [ConvMode::Valid, ConvMode::FullExtent] {
            let expected = conv_naive(&input, &filter, mode).unwrap();
            let actual = conv_tiles(&mut ScalarTiles::new(), &input, &filter, mode).unwrap();
            assert_eq!(actual, expected, "{:?}", mode);
        }
    }
}
