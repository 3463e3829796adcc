#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_afloat_too_large_for_i32() {
    assert_eq!(
        checked_convert::<I32>(AFloat(2_147_483_648.0)),
        Err(ConversionFailure::ExceedsPositiveLimit)
    );
    assert_eq!(
        checked_convert::<I32>(AFloat(2_147_483_647.0)).unwrap(),
        I32(i32::MAX)
    );
}

#[test]
fn test_negative_aint_to_u32() {
    assert_eq!(
        checked_convert::<U32>(AInt(-1)),
        Err(ConversionFailure::ExceedsNegativeLimit)
    );
    assert_eq!(checked_convert::<U32>(AInt(0)).unwrap(), U32(0));
}

#[test]
fn test_f16_saturates_but_range_check_fails() {
    assert_eq!(F16::new(100_000.0).value(), f32::INFINITY);
    assert_eq!(F16::new(-100_000.0).value(), f32::NEG_INFINITY);
    assert_eq!(
        checked_convert::<F16>(AFloat(100_000.0)),
        Err(ConversionFailure::ExceedsPositiveLimit)
    );
    assert_eq!(
        checked_convert::<F16>(AFloat(-65_505.0)),
        Err(ConversionFailure::ExceedsNegativeLimit)
    );
    assert_eq!(checked_convert::<F16>(AFloat(65_504.0)).unwrap(), F16::HIGHEST);
}

#[test]
fn test_f16_limits() {
    assert_eq!(F16::HIGHEST.value(), 65_504.0);
    assert_eq!(F16::LOWEST.value(), -65_504.0);
    assert_eq!(F16::SMALLEST.value(), 2f32.powi(-14));
    assert_eq!(F16::MIN_SUBNORMAL, 2f32.powi(-24));
}

#[test]
fn test_f16_quantize_truncates() {
    // 1 + 2^-11 is not representable; truncation drops it.
    let value = 1.0 + 2f32.powi(-11);
    assert_eq!(F16::new(value).value(), 1.0);
    // 1 + 2^-10 is the next f16 after 1.
    let next = 1.0 + 2f32.powi(-10);
    assert_eq!(F16::new(next).value(), next);
    // Below the smallest subnormal flushes to signed zero.
    assert!(F16::new(-1e-9).value().is_sign_negative());
    assert_eq!(F16::new(1e-9).value(), 0.0);
    // Subnormals snap down to a multiple of 2^-24.
    let sub = 2.5 * F16::MIN_SUBNORMAL;
    assert_eq!(F16::new(sub).value(), 2.0 * F16::MIN_SUBNORMAL);
    assert!(F16::new(f32::NAN).value().is_nan());
}

#[test]
fn test_float_equality_respects_sign_of_zero() {
    assert_ne!(F32(0.0), F32(-0.0));
    assert_eq!(AFloat(-0.0), AFloat(-0.0));
    assert_ne!(AFloat(f64::NAN), AFloat(f64::NAN));
}

#[test]
fn test_checked_integer_arithmetic() {
    assert_eq!(I32(i32::MAX).checked_add(I32(1)), None);
    assert_eq!(I32(2).checked_add(I32(3)), Some(I32(5)));
    assert_eq!(U32(0).checked_sub(U32(1)), None);
    assert_eq!(AInt(i64::MAX).checked_mul(AInt(2)), None);
    assert_eq!(I32(i32::MIN).checked_div(I32(-1)), None);
    assert_eq!(I32(7).checked_div(I32(0)), None);
    assert_eq!(AInt(3).checked_madd(AInt(4), AInt(5)), Some(AInt(17)));
}

#[test]
fn test_checked_float_arithmetic() {
    assert_eq!(F32(f32::MAX).checked_mul(F32(2.0)), None);
    assert_eq!(F32(1.5).checked_add(F32(2.0)), Some(F32(3.5)));
    assert_eq!(F16::new(60_000.0).checked_add(F16::new(10_000.0)), None);
    assert_eq!(AFloat(1.0).checked_div(AFloat(0.0)), None);
    assert_eq!(AFloat(f64::MAX).checked_madd(AFloat(2.0), AFloat(0.0)), None);
}

#[test]
fn test_scalar_convert_dispatch() {
    let value = Scalar::AInt(AInt(42));
    assert_eq!(value.convert(NumberKind::F32).unwrap(), Scalar::F32(F32(42.0)));
    assert_eq!(value.convert(NumberKind::U32).unwrap(), Scalar::U32(U32(42)));
    assert_eq!(
        Scalar::AFloat(AFloat(f64::NAN)).convert(NumberKind::I32),
        Err(ConversionFailure::ExceedsPositiveLimit)
    );
    assert_eq!(Scalar::AFloat(AFloat(-1.5)).convert(NumberKind::I32).unwrap(), Scalar::I32(I32(-1)));
}

#[test]
fn test_kind_names() {
    assert_eq!(NumberKind::AbstractInt.name(), "abstract-int");
    assert_eq!(Scalar::zero(NumberKind::F16).kind(), NumberKind::F16);
    assert_eq!(Scalar::one(NumberKind::U32), Scalar::U32(U32(1)));
    assert_eq!(Scalar::F32(F32(1.5)).to_string(), "1.5");
}

// === Property tests ===

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod properties {
    use proptest::prelude::*;

    use super::super::*;

    proptest! {
        #[test]
        fn i32_conversion_matches_std(value in any::<i64>()) {
            let expected = i32::try_from(value).ok();
            prop_assert_eq!(checked_convert::<I32>(AInt(value)).ok().map(|v| v.0), expected);
        }

        #[test]
        fn u32_conversion_matches_std(value in any::<i64>()) {
            let expected = u32::try_from(value).ok();
            prop_assert_eq!(checked_convert::<U32>(AInt(value)).ok().map(|v| v.0), expected);
        }

        #[test]
        fn failure_direction_matches_sign(value in any::<i64>()) {
            if let Err(failure) = checked_convert::<I32>(AInt(value)) {
                let expected = if value > 0 {
                    ConversionFailure::ExceedsPositiveLimit
                } else {
                    ConversionFailure::ExceedsNegativeLimit
                };
                prop_assert_eq!(failure, expected);
            }
        }

        #[test]
        fn checked_add_matches_std(a in any::<i32>(), b in any::<i32>()) {
            prop_assert_eq!(I32(a).checked_add(I32(b)).map(|v| v.0), a.checked_add(b));
        }

        #[test]
        fn f16_quantize_is_idempotent(value in any::<f32>()) {
            let once = F16::quantize(value);
            let twice = F16::quantize(once);
            prop_assert!(once.to_bits() == twice.to_bits() || once.is_nan());
        }

        #[test]
        fn f16_quantize_never_grows_magnitude(value in -65_504.0f32..65_504.0) {
            prop_assert!(F16::quantize(value).abs() <= value.abs());
        }

        #[test]
        fn float_results_are_finite(a in any::<f32>(), b in any::<f32>()) {
            if let Some(sum) = F32(a).checked_add(F32(b)) {
                prop_assert!(sum.0.is_finite());
            }
        }
    }
}
