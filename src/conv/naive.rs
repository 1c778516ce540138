use super::{ConvMode, FilterBank, Volume, check_conv_dims};
use crate::error::Result;

/// Direct convolution, one output channel value at a time.
///
/// `out[r][c][oc] = Σ in[r+fr][c+fc][ic] · f[ic][fr][fc][oc]` over the
/// window and input channels. In [`ConvMode::FullExtent`] taps outside the
/// input contribute nothing. Sums wrap on overflow, like `tdpbssd`.
pub fn conv_naive(input: &Volume<i8>, filter: &FilterBank, mode: ConvMode) -> Result<Volume<i32>> {
    check_conv_dims(input, filter)?;

    let f = filter.size();
    let (out_rows, out_cols) = mode.output_extent(input.rows(), input.cols(), f);
    let mut output = Volume::zeros(out_rows, out_cols, filter.out_channels());

    for r in 0..out_rows {
        for c in 0..out_cols {
            for oc in 0..filter.out_channels() {
                let mut acc = 0i32;
                for fr in 0..f {
                    for fc in 0..f {
                        for ic in 0..filter.in_channels() {
                            let Some(x) = input.get_checked(r + fr, c + fc, ic) else {
                                continue;
                            };
                            let w = filter.get(ic, fr, fc, oc);
                            acc = acc.wrapping_add(x as i32 * w as i32);
                        }
                    }
                }
                output.set(r, c, oc, acc);
            }
        }
    }
    Ok(output)
}
