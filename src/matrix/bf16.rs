//! f32 <-> bf16 conversion by truncation.
//!
//! Narrowing keeps the upper 16 bits of the f32 pattern and drops the rest.
//! There is no rounding: `half::bf16::from_f32` rounds to nearest-even and
//! would make the reference and tile paths disagree, so it is not used here.

use half::bf16;

use super::Matrix;

/// Narrow an f32 to bf16 by dropping the low 16 mantissa bits.
///
/// ```
/// use amxmul::matrix::bf16::{bf16_to_fp32, fp32_to_bf16};
///
/// let x = f32::from_bits(0x3F80_FFFF); // just above 1.0
/// assert_eq!(bf16_to_fp32(fp32_to_bf16(x)), 1.0);
/// ```
#[inline]
pub fn fp32_to_bf16(value: f32) -> bf16 {
    bf16::from_bits((value.to_bits() >> 16) as u16)
}

/// Widen a bf16 back to f32; the low 16 bits come back as zero.
#[inline]
pub fn bf16_to_fp32(value: bf16) -> f32 {
    f32::from_bits((value.to_bits() as u32) << 16)
}

/// Narrow every element of `m`.
pub fn narrow_matrix(m: &Matrix<f32>) -> Matrix<bf16> {
    m.map(fp32_to_bf16)
}

/// Widen every element of `m`.
pub fn widen_matrix(m: &Matrix<bf16>) -> Matrix<f32> {
    m.map(bf16_to_fp32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_instead_of_rounding() {
        // 0x3F81_8000 sits exactly halfway; 0x3F81_C000 is above halfway.
        // Round-to-nearest would bump both to 0x3F82.
        for bits in [0x3F81_8000u32, 0x3F81_C000, 0x3F81_FFFF] {
            let x = f32::from_bits(bits);
            assert_eq!(fp32_to_bf16(x).to_bits(), 0x3F81);
            assert_ne!(fp32_to_bf16(x), bf16::from_f32(x));
        }
    }

    #[test]
    fn test_exact_values_survive() {
        for x in [0.0f32, -0.0, 0.5, 1.0, -23.5, 1024.0, f32::INFINITY] {
            assert_eq!(bf16_to_fp32(fp32_to_bf16(x)).to_bits(), x.to_bits());
        }
    }

    #[test]
    fn test_narrow_matrix_keeps_shape() {
        let m = Matrix::from_fn(3, 4, |r, c| r as f32 * 0.5 + c as f32);
        let n = narrow_matrix(&m);
        assert_eq!((n.rows(), n.cols()), (3, 4));
        assert_eq!(widen_matrix(&n), m);
    }
}
