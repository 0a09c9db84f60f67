//! Every dispatching operation must produce the same bytes as its scalar
//! fallback, with each SIMD tier enabled and disabled.
//!
//! Run with: cargo test --test backend_parity
//! Run with masking: cargo test --features msan --test backend_parity

use archmage::testing::{CompileTimePolicy, for_each_token_permutation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zenvec::{V128, memory, overread, rounding};

/// 16-byte aligned scratch buffer.
#[repr(C, align(16))]
struct Aligned([u8; 64]);

fn random_vectors(seed: u64, n: usize) -> Vec<V128> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| V128::from_bytes(rng.random())).collect()
}

#[test]
fn loads_match_scalar_all_tiers() {
    let mut rng = StdRng::seed_from_u64(0x10ad);
    let mut buf = Aligned([0; 64]);
    rng.fill(&mut buf.0[..]);

    let report = for_each_token_permutation(CompileTimePolicy::Warn, |_perm| {
        for x in 0..=48 {
            let row = &buf.0[x..];
            let w2: &[u8; 2] = row[..2].try_into().unwrap();
            let w2b: &[u8; 2] = row[2..4].try_into().unwrap();
            let w4: &[u8; 4] = row[..4].try_into().unwrap();
            let w4b: &[u8; 4] = row[4..8].try_into().unwrap();
            let w8: &[u8; 8] = row[..8].try_into().unwrap();
            let w16: &[u8; 16] = row[..16].try_into().unwrap();

            assert_eq!(memory::load2(w2), memory::load2_scalar(w2), "x={x}");
            assert_eq!(memory::load2x2(w2, w2b), memory::load2x2_scalar(w2, w2b));
            assert_eq!(memory::load4(w4), memory::load4_scalar(w4));
            assert_eq!(memory::load4x2(w4, w4b), memory::load4x2_scalar(w4, w4b));
            assert_eq!(memory::load_lo8(w8), memory::load_lo8_scalar(w8));
            assert_eq!(memory::load_unaligned16(w16), memory::load_unaligned16_scalar(w16));

            let base = V128::from_bytes([0x5A; 16]);
            assert_eq!(memory::load_hi8(base, w8), memory::load_hi8_scalar(base, w8));
            if x % 16 == 0 {
                assert_eq!(memory::load_aligned16(w16), memory::load_aligned16_scalar(w16));
            }
        }
    });
    assert!(report.permutations_run >= 1);
}

#[test]
fn stores_round_trip_all_tiers() {
    let vectors = random_vectors(0x5701e, 64);
    let report = for_each_token_permutation(CompileTimePolicy::Warn, |_perm| {
        for &v in &vectors {
            let bytes = v.to_bytes();
            let mut buf = Aligned([0xCC; 64]);

            memory::store2((&mut buf.0[1..3]).try_into().unwrap(), v);
            memory::store4((&mut buf.0[5..9]).try_into().unwrap(), v);
            memory::store_lo8((&mut buf.0[10..18]).try_into().unwrap(), v);
            memory::store_hi8((&mut buf.0[19..27]).try_into().unwrap(), v);
            memory::store_aligned16((&mut buf.0[32..48]).try_into().unwrap(), v);
            memory::store_unaligned16((&mut buf.0[47..63]).try_into().unwrap(), v);

            assert_eq!(&buf.0[1..3], &bytes[..2]);
            assert_eq!(&buf.0[5..9], &bytes[..4]);
            assert_eq!(&buf.0[10..18], &bytes[..8]);
            assert_eq!(&buf.0[19..27], &bytes[8..]);
            assert_eq!(&buf.0[32..47], &bytes[..15]);
            assert_eq!(&buf.0[47..63], &bytes[..]);
            // Gaps between the stores are untouched.
            for gap in [0, 3, 4, 9, 18, 27, 31, 63] {
                assert_eq!(buf.0[gap], 0xCC, "byte {gap} clobbered");
            }

            let w16: &[u8; 16] = buf.0[47..63].try_into().unwrap();
            assert_eq!(memory::load_unaligned16(w16), v);
        }
    });
    assert!(report.permutations_run >= 1);
}

macro_rules! check_lane {
    ($base:expr, $src:expr, $($lane:literal)*) => {$(
        let got = memory::load2_lane::<$lane>($base, $src);
        assert_eq!(got, memory::load2_lane_scalar::<$lane>($base, $src));
        let want_lane = u16::from_le_bytes(*$src);
        for (i, (&g, &b)) in got.u16_lanes().iter().zip($base.u16_lanes().iter()).enumerate() {
            if i == $lane {
                assert_eq!(g, want_lane, "lane {} not written", $lane);
            } else {
                assert_eq!(g, b, "lane {i} changed by insert into lane {}", $lane);
            }
        }
    )*};
}

#[test]
fn lane_insert_touches_only_its_lane_all_tiers() {
    let vectors = random_vectors(0x1a4e, 16);
    let report = for_each_token_permutation(CompileTimePolicy::Warn, |_perm| {
        for &base in &vectors {
            let src = &[0xEF, 0xBE];
            check_lane!(base, src, 0 1 2 3 4 5 6 7);
        }
    });
    assert!(report.permutations_run >= 1);
}

#[test]
fn masking_matches_scalar_all_tiers() {
    let vectors = random_vectors(0x3a5c, 8);
    let report = for_each_token_permutation(CompileTimePolicy::Warn, |_perm| {
        for &v in &vectors {
            for e in -4..=20isize {
                assert_eq!(
                    overread::mask_overreads_with::<zenvec::ZeroOverread>(v, e),
                    overread::mask_overreads_with_scalar::<zenvec::ZeroOverread>(v, e),
                    "e={e}"
                );
                assert_eq!(overread::mask_overreads_with::<zenvec::KeepOverread>(v, e), v);
                assert_eq!(
                    overread::mask_overreads(v, e),
                    overread::mask_overreads_with_scalar::<zenvec::ActiveOverread>(v, e)
                );

                let src = v.to_bytes();
                let lo: &[u8; 8] = src[..8].try_into().unwrap();
                assert_eq!(
                    overread::load_lo8_msan(lo, e),
                    overread::load_lo8_msan_scalar(lo, e)
                );
                assert_eq!(
                    overread::load_hi8_msan(v, lo, e),
                    overread::load_hi8_msan_scalar(v, lo, e)
                );
                assert_eq!(
                    overread::load_unaligned16_msan(&src, e),
                    overread::load_unaligned16_msan_scalar(&src, e)
                );
                assert_eq!(
                    overread::load_lo8_msan_with::<zenvec::ZeroOverread>(lo, e),
                    overread::load_lo8_msan_with_scalar::<zenvec::ZeroOverread>(lo, e)
                );
                assert_eq!(
                    overread::load_hi8_msan_with::<zenvec::ZeroOverread>(v, lo, e),
                    overread::load_hi8_msan_with_scalar::<zenvec::ZeroOverread>(v, lo, e)
                );
                assert_eq!(
                    overread::load_unaligned16_msan_with::<zenvec::ZeroOverread>(&src, e),
                    overread::load_unaligned16_msan_with_scalar::<zenvec::ZeroOverread>(&src, e)
                );
            }
            for n in 0..=16 {
                assert_eq!(zenvec::mask_high_bytes(n), zenvec::mask::mask_high_bytes_scalar(n));
            }
        }
    });
    assert!(report.permutations_run >= 1);
}

#[test]
fn rounding_matches_scalar_all_tiers() {
    let mut vectors = random_vectors(0x5011d, 512);
    vectors.push(V128::ZERO);
    vectors.push(V128::ONES);
    vectors.push(V128::from_i16_lanes([i16::MIN, i16::MAX, -1, 1, -2, 2, 0, -32767]));
    vectors.push(V128::from_i32_lanes([i32::MIN, i32::MAX, -1, 1]));

    let report = for_each_token_permutation(CompileTimePolicy::Warn, |_perm| {
        for &v in &vectors {
            macro_rules! same {
                ($op:ident, $scalar:ident, $($bits:literal)*) => {$(
                    assert_eq!(rounding::$op::<$bits>(v), rounding::$scalar::<$bits>(v),
                        "{} bits={} v={:?}", stringify!($op), $bits, v);
                )*};
            }
            same!(right_shift_with_rounding_u16x8, right_shift_with_rounding_u16x8_scalar,
                1 2 3 4 5 6 7 8 11 12 13 15 16);
            same!(right_shift_with_rounding_i16x8, right_shift_with_rounding_i16x8_scalar,
                1 2 3 4 5 6 7 8 11 12 13 14 15);
            same!(right_shift_with_rounding_u32x4, right_shift_with_rounding_u32x4_scalar,
                1 2 3 6 7 10 11 12 14 16 20 24 31 32);
            same!(right_shift_with_rounding_i32x4, right_shift_with_rounding_i32x4_scalar,
                1 2 3 6 7 10 11 12 14 16 20 24 30 31);
            for bits in 1..32 {
                assert_eq!(
                    rounding::variable_right_shift_with_rounding_i32x4(v, bits),
                    rounding::variable_right_shift_with_rounding_i32x4_scalar(v, bits),
                    "bits={bits}"
                );
            }
        }
    });
    assert!(report.permutations_run >= 1);
}

#[test]
fn zero_policy_keeps_logical_bytes_all_tiers() {
    let src: [u8; 16] = core::array::from_fn(|i| i as u8 + 1);
    let lo: &[u8; 8] = src[..8].try_into().unwrap();
    let report = for_each_token_permutation(CompileTimePolicy::Warn, |_perm| {
        for e in 0..=16isize {
            let keep = 16 - e as usize;
            let mut expected = [0u8; 16];
            expected[..keep].copy_from_slice(&src[..keep]);
            let v = overread::load_unaligned16_msan_with::<zenvec::ZeroOverread>(&src, e);
            assert_eq!(v.to_bytes(), expected, "e={e}");
        }
        assert_eq!(
            overread::load_lo8_msan_with::<zenvec::ZeroOverread>(lo, 3).to_bytes(),
            [1, 2, 3, 4, 5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        let mut expected = [0xFFu8; 16];
        expected[..7].fill(0);
        assert_eq!(zenvec::mask_high_bytes(7).to_bytes(), expected);
    });
    assert!(report.permutations_run >= 1);
}

#[test]
fn load_round_store_pipeline() {
    let report = for_each_token_permutation(CompileTimePolicy::Warn, |_perm| {
        let v = zenvec::load4(&[0x01, 0x02, 0x03, 0x04]);
        let r = zenvec::right_shift_with_rounding_i32x4::<2>(v);
        assert_eq!(r.i32_lanes()[0], 16_826_496);

        let mut out = [0u8; 4];
        zenvec::store4(&mut out, r);
        assert_eq!(i32::from_le_bytes(out), 16_826_496);
    });
    assert!(report.permutations_run >= 1);
}

#[test]
fn backend_report_is_consistent() {
    let backend = zenvec::SimdBackend::detect();
    assert_eq!(backend.is_simd(), zenvec::simd_token().is_some());
    assert!(["sse", "neon", "scalar"].contains(&backend.to_string().as_str()));
}
