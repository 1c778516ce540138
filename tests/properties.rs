use amxmul::matrix::Matrix;
use amxmul::matrix::bf16::{bf16_to_fp32, fp32_to_bf16};
use amxmul::matrix::repack::{deinterleave, interleave};
use half::bf16;
use proptest::prelude::*;

// ============================================================================
// Truncating bf16 conversion
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// widen(narrow(x)) keeps exactly the high 16 bits
    #[test]
    fn prop_roundtrip_zeroes_low_bits(bits in any::<u32>()) {
        let x = f32::from_bits(bits);
        prop_assert_eq!(bf16_to_fp32(fp32_to_bf16(x)).to_bits(), bits & 0xFFFF_0000);
    }

    /// Truncation and round-to-nearest only part ways above the halfway point
    #[test]
    fn prop_differs_from_rounding_only_above_half(bits in any::<u32>()) {
        let x = f32::from_bits(bits);
        prop_assume!(!x.is_nan());

        let truncated = fp32_to_bf16(x).to_bits();
        let rounded = bf16::from_f32(x).to_bits();
        let low = bits & 0xFFFF;
        if low < 0x8000 {
            prop_assert_eq!(truncated, rounded);
        } else if low > 0x8000 {
            prop_assert_eq!(truncated.wrapping_add(1), rounded);
        }
    }
}

// ============================================================================
// Interleave layout
// ============================================================================

fn arb_i8_matrix() -> impl Strategy<Value = Matrix<i8>> {
    (1usize..=16, 1usize..=16).prop_flat_map(|(groups, cols)| {
        prop::collection::vec(any::<i8>(), groups * 4 * cols)
            .prop_map(move |data| Matrix::from_vec(groups * 4, cols, data).unwrap())
    })
}

fn arb_bf16_matrix() -> impl Strategy<Value = Matrix<bf16>> {
    (1usize..=16, 1usize..=16).prop_flat_map(|(groups, cols)| {
        prop::collection::vec(any::<u16>(), groups * 2 * cols).prop_map(move |data| {
            let data = data.into_iter().map(bf16::from_bits).collect();
            Matrix::from_vec(groups * 2, cols, data).unwrap()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_i8_interleave_is_invertible(m in arb_i8_matrix()) {
        let packed = interleave(&m).unwrap();
        prop_assert_eq!(packed.rows() * 4, m.rows());
        prop_assert_eq!(packed.cols(), m.cols() * 4);
        prop_assert_eq!(deinterleave(&packed).unwrap(), m);
    }

    #[test]
    fn prop_bf16_interleave_is_invertible(m in arb_bf16_matrix()) {
        let packed = interleave(&m).unwrap();
        let back = deinterleave(&packed).unwrap();
        let bits = |m: &Matrix<bf16>| m.as_slice().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        prop_assert_eq!(bits(&back), bits(&m));
    }

    /// Every source element lands in exactly one packed slot
    #[test]
    fn prop_interleave_is_a_permutation(groups in 1usize..=16, cols in 1usize..=32) {
        let rows = groups * 2;
        let m = Matrix::from_fn(rows, cols, |r, c| bf16::from_bits((r * cols + c) as u16));

        let packed = interleave(&m).unwrap();

        let mut seen: Vec<u16> = packed.as_slice().iter().map(|v| v.to_bits()).collect();
        seen.sort_unstable();
        let expected: Vec<u16> = (0..(rows * cols) as u16).collect();
        prop_assert_eq!(seen, expected);
    }
}
