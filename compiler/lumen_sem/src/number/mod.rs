//! Numeric value model.
//!
//! Six scalar kinds share one [`Number`] trait: `i32`, `u32`, `f32`, `f16`
//! (stored as a quantized `f32`) and the two abstract kinds used for
//! unsuffixed literals, `AInt` (`i64`) and `AFloat` (`f64`).
//!
//! Cross-kind comparison and conversion always happen in the widest
//! representation that can hold both sides: `f64` if either side is a float,
//! `i64` otherwise.

use std::fmt;

use thiserror::Error;

/// Why a conversion between number kinds failed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Error)]
pub enum ConversionFailure {
    #[error("value exceeds positive limit of target type")]
    ExceedsPositiveLimit,
    #[error("value exceeds negative limit of target type")]
    ExceedsNegativeLimit,
}

/// Discriminant of a number kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumberKind {
    I32,
    U32,
    F32,
    F16,
    AbstractInt,
    AbstractFloat,
}

impl NumberKind {
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            NumberKind::F32 | NumberKind::F16 | NumberKind::AbstractFloat
        )
    }

    pub const fn is_abstract(self) -> bool {
        matches!(self, NumberKind::AbstractInt | NumberKind::AbstractFloat)
    }

    pub const fn name(self) -> &'static str {
        match self {
            NumberKind::I32 => "i32",
            NumberKind::U32 => "u32",
            NumberKind::F32 => "f32",
            NumberKind::F16 => "f16",
            NumberKind::AbstractInt => "abstract-int",
            NumberKind::AbstractFloat => "abstract-float",
        }
    }
}

/// Common interface of the six number kinds.
pub trait Number: Copy + fmt::Debug + fmt::Display + Into<Scalar> {
    const KIND: NumberKind;
    /// Largest finite value.
    const HIGHEST: Self;
    /// Most negative finite value.
    const LOWEST: Self;
    /// Smallest positive normal value for floats, zero for integers.
    const SMALLEST: Self;

    fn to_f64(self) -> f64;

    /// Build from an `f64` that is already known to be in range.
    /// Floats to integers truncate toward zero.
    fn from_f64_in_range(value: f64) -> Self;

    /// Build from an `i64` that is already known to be in range.
    fn from_i64_in_range(value: i64) -> Self;

    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn checked_mul(self, rhs: Self) -> Option<Self>;
    /// `None` on division by zero or overflow.
    fn checked_div(self, rhs: Self) -> Option<Self>;
    fn checked_rem(self, rhs: Self) -> Option<Self>;

    /// `a * b + c` with the overflow rules of [`Number::checked_mul`] and
    /// [`Number::checked_add`].
    fn checked_madd(self, b: Self, c: Self) -> Option<Self> {
        self.checked_mul(b)?.checked_add(c)
    }

    #[expect(clippy::float_cmp, reason = "exact zero test")]
    fn is_zero(self) -> bool {
        self.to_f64() == 0.0
    }
}

// ============================================================================
// Integer Kinds
// ============================================================================

macro_rules! define_integer {
    ($(#[$meta:meta])* $name:ident, $repr:ty, $kind:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
        pub struct $name(pub $repr);

        impl Number for $name {
            const KIND: NumberKind = $kind;
            const HIGHEST: Self = $name(<$repr>::MAX);
            const LOWEST: Self = $name(<$repr>::MIN);
            const SMALLEST: Self = $name(0);

            #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
            fn to_f64(self) -> f64 {
                self.0 as f64
            }

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn from_f64_in_range(value: f64) -> Self {
                $name(value as $repr)
            }

            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::unnecessary_cast
            )]
            fn from_i64_in_range(value: i64) -> Self {
                $name(value as $repr)
            }

            fn checked_add(self, rhs: Self) -> Option<Self> {
                self.0.checked_add(rhs.0).map($name)
            }

            fn checked_sub(self, rhs: Self) -> Option<Self> {
                self.0.checked_sub(rhs.0).map($name)
            }

            fn checked_mul(self, rhs: Self) -> Option<Self> {
                self.0.checked_mul(rhs.0).map($name)
            }

            fn checked_div(self, rhs: Self) -> Option<Self> {
                self.0.checked_div(rhs.0).map($name)
            }

            fn checked_rem(self, rhs: Self) -> Option<Self> {
                self.0.checked_rem(rhs.0).map($name)
            }

            fn is_zero(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_integer!(
    /// 32-bit signed integer.
    I32, i32, NumberKind::I32
);
define_integer!(
    /// 32-bit unsigned integer.
    U32, u32, NumberKind::U32
);
define_integer!(
    /// Abstract integer: the type of unsuffixed integer literals.
    AInt, i64, NumberKind::AbstractInt
);

// ============================================================================
// Float Kinds
// ============================================================================

/// Float equality treats `0.0` and `-0.0` as different values.
#[expect(clippy::float_cmp, reason = "exact equality is the semantics")]
fn float_eq(a: f64, b: f64) -> bool {
    a.is_sign_negative() == b.is_sign_negative() && a == b
}

/// Finite results only.
fn finite<T: Number>(value: f64) -> Option<T> {
    let converted = T::from_f64_in_range(value);
    converted.to_f64().is_finite().then_some(converted)
}

macro_rules! impl_float_ops {
    () => {
        fn checked_add(self, rhs: Self) -> Option<Self> {
            finite(self.to_f64() + rhs.to_f64())
        }

        fn checked_sub(self, rhs: Self) -> Option<Self> {
            finite(self.to_f64() - rhs.to_f64())
        }

        fn checked_mul(self, rhs: Self) -> Option<Self> {
            finite(self.to_f64() * rhs.to_f64())
        }

        fn checked_div(self, rhs: Self) -> Option<Self> {
            if rhs.is_zero() {
                return None;
            }
            finite(self.to_f64() / rhs.to_f64())
        }

        fn checked_rem(self, rhs: Self) -> Option<Self> {
            if rhs.is_zero() {
                return None;
            }
            finite(self.to_f64() % rhs.to_f64())
        }
    };
}

/// 32-bit float.
#[derive(Copy, Clone, Debug, PartialOrd, Default)]
pub struct F32(pub f32);

impl Number for F32 {
    const KIND: NumberKind = NumberKind::F32;
    const HIGHEST: Self = F32(f32::MAX);
    const LOWEST: Self = F32(f32::MIN);
    const SMALLEST: Self = F32(f32::MIN_POSITIVE);

    fn to_f64(self) -> f64 {
        f64::from(self.0)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "narrowing to f32 is the conversion"
    )]
    fn from_f64_in_range(value: f64) -> Self {
        F32(value as f32)
    }

    #[expect(clippy::cast_precision_loss, reason = "nearest f32 is the conversion")]
    fn from_i64_in_range(value: i64) -> Self {
        F32(value as f32)
    }

    impl_float_ops!();
}

/// 16-bit float, emulated with an `f32` that only holds f16-representable
/// values.
///
/// Construction quantizes: magnitudes beyond 65504 become infinities, values
/// below the smallest subnormal flush to signed zero, and everything else is
/// truncated (never rounded) to the f16 mantissa.
#[derive(Copy, Clone, Debug, PartialOrd, Default)]
pub struct F16(f32);

impl F16 {
    /// Largest finite f16 value.
    pub const MAX: f32 = 65504.0;
    /// Smallest positive normal f16 value, 2^-14.
    pub const MIN_POSITIVE: f32 = 1.0 / 16_384.0;
    /// Smallest positive subnormal f16 value, 2^-24.
    pub const MIN_SUBNORMAL: f32 = 1.0 / 16_777_216.0;

    pub fn new(value: f32) -> Self {
        F16(Self::quantize(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Truncate an `f32` to the nearest f16-representable value toward zero.
    pub fn quantize(value: f32) -> f32 {
        if value.is_nan() {
            return value;
        }
        let magnitude = value.abs();
        if magnitude > Self::MAX {
            return if value.is_sign_negative() {
                f32::NEG_INFINITY
            } else {
                f32::INFINITY
            };
        }
        if magnitude < Self::MIN_SUBNORMAL {
            return if value.is_sign_negative() { -0.0 } else { 0.0 };
        }
        if magnitude < Self::MIN_POSITIVE {
            // Subnormal f16: a whole multiple of the smallest subnormal.
            let steps = (magnitude / Self::MIN_SUBNORMAL).trunc();
            return (steps * Self::MIN_SUBNORMAL).copysign(value);
        }
        // Normal f16 keeps 10 of f32's 23 mantissa bits.
        f32::from_bits(value.to_bits() & !0x1FFF)
    }
}

impl Number for F16 {
    const KIND: NumberKind = NumberKind::F16;
    const HIGHEST: Self = F16(F16::MAX);
    const LOWEST: Self = F16(-F16::MAX);
    const SMALLEST: Self = F16(F16::MIN_POSITIVE);

    fn to_f64(self) -> f64 {
        f64::from(self.0)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "quantization narrows further anyway"
    )]
    fn from_f64_in_range(value: f64) -> Self {
        F16::new(value as f32)
    }

    #[expect(clippy::cast_precision_loss, reason = "quantization narrows further anyway")]
    fn from_i64_in_range(value: i64) -> Self {
        F16::new(value as f32)
    }

    impl_float_ops!();
}

/// Abstract float: the type of unsuffixed float literals.
#[derive(Copy, Clone, Debug, PartialOrd, Default)]
pub struct AFloat(pub f64);

impl Number for AFloat {
    const KIND: NumberKind = NumberKind::AbstractFloat;
    const HIGHEST: Self = AFloat(f64::MAX);
    const LOWEST: Self = AFloat(f64::MIN);
    const SMALLEST: Self = AFloat(f64::MIN_POSITIVE);

    fn to_f64(self) -> f64 {
        self.0
    }

    fn from_f64_in_range(value: f64) -> Self {
        AFloat(value)
    }

    #[expect(clippy::cast_precision_loss, reason = "nearest f64 is the conversion")]
    fn from_i64_in_range(value: i64) -> Self {
        AFloat(value as f64)
    }

    impl_float_ops!();
}

macro_rules! impl_float_traits {
    ($($name:ident),*) => {$(
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                float_eq(self.to_f64(), other.to_f64())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:?}", self.0)
            }
        }
    )*};
}

impl_float_traits!(F32, F16, AFloat);

// ============================================================================
// Dynamic Scalars
// ============================================================================

/// A number of any kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar {
    I32(I32),
    U32(U32),
    F32(F32),
    F16(F16),
    AInt(AInt),
    AFloat(AFloat),
}

impl Scalar {
    pub const fn kind(self) -> NumberKind {
        match self {
            Scalar::I32(_) => NumberKind::I32,
            Scalar::U32(_) => NumberKind::U32,
            Scalar::F32(_) => NumberKind::F32,
            Scalar::F16(_) => NumberKind::F16,
            Scalar::AInt(_) => NumberKind::AbstractInt,
            Scalar::AFloat(_) => NumberKind::AbstractFloat,
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::I32(v) => v.to_f64(),
            Scalar::U32(v) => v.to_f64(),
            Scalar::F32(v) => v.to_f64(),
            Scalar::F16(v) => v.to_f64(),
            Scalar::AInt(v) => v.to_f64(),
            Scalar::AFloat(v) => v.to_f64(),
        }
    }

    /// Integer value, or `None` for float kinds.
    pub fn to_i64(self) -> Option<i64> {
        match self {
            Scalar::I32(v) => Some(i64::from(v.0)),
            Scalar::U32(v) => Some(i64::from(v.0)),
            Scalar::AInt(v) => Some(v.0),
            Scalar::F32(_) | Scalar::F16(_) | Scalar::AFloat(_) => None,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Scalar::I32(v) => v.is_zero(),
            Scalar::U32(v) => v.is_zero(),
            Scalar::F32(v) => v.is_zero(),
            Scalar::F16(v) => v.is_zero(),
            Scalar::AInt(v) => v.is_zero(),
            Scalar::AFloat(v) => v.is_zero(),
        }
    }

    /// Range-checked conversion to another kind.
    pub fn convert(self, to: NumberKind) -> Result<Scalar, ConversionFailure> {
        Ok(match to {
            NumberKind::I32 => Scalar::I32(checked_convert(self)?),
            NumberKind::U32 => Scalar::U32(checked_convert(self)?),
            NumberKind::F32 => Scalar::F32(checked_convert(self)?),
            NumberKind::F16 => Scalar::F16(checked_convert(self)?),
            NumberKind::AbstractInt => Scalar::AInt(checked_convert(self)?),
            NumberKind::AbstractFloat => Scalar::AFloat(checked_convert(self)?),
        })
    }

    /// Zero of the given kind.
    pub fn zero(kind: NumberKind) -> Scalar {
        match kind {
            NumberKind::I32 => Scalar::I32(I32(0)),
            NumberKind::U32 => Scalar::U32(U32(0)),
            NumberKind::F32 => Scalar::F32(F32(0.0)),
            NumberKind::F16 => Scalar::F16(F16::new(0.0)),
            NumberKind::AbstractInt => Scalar::AInt(AInt(0)),
            NumberKind::AbstractFloat => Scalar::AFloat(AFloat(0.0)),
        }
    }

    /// One of the given kind.
    pub fn one(kind: NumberKind) -> Scalar {
        match kind {
            NumberKind::I32 => Scalar::I32(I32(1)),
            NumberKind::U32 => Scalar::U32(U32(1)),
            NumberKind::F32 => Scalar::F32(F32(1.0)),
            NumberKind::F16 => Scalar::F16(F16::new(1.0)),
            NumberKind::AbstractInt => Scalar::AInt(AInt(1)),
            NumberKind::AbstractFloat => Scalar::AFloat(AFloat(1.0)),
        }
    }
}

macro_rules! impl_into_scalar {
    ($($name:ident),*) => {$(
        impl From<$name> for Scalar {
            fn from(value: $name) -> Self {
                Scalar::$name(value)
            }
        }
    )*};
}

impl_into_scalar!(I32, U32, F32, F16, AInt, AFloat);

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::I32(v) => v.fmt(f),
            Scalar::U32(v) => v.fmt(f),
            Scalar::F32(v) => v.fmt(f),
            Scalar::F16(v) => v.fmt(f),
            Scalar::AInt(v) => v.fmt(f),
            Scalar::AFloat(v) => v.fmt(f),
        }
    }
}

/// Convert `value` to number kind `T`, failing if it is outside `T`'s
/// finite range.
///
/// NaN converts to NaN for float targets and fails with
/// `ExceedsPositiveLimit` for integer targets.
pub fn checked_convert<T: Number>(value: impl Into<Scalar>) -> Result<T, ConversionFailure> {
    let value = value.into();
    if T::KIND.is_float() || value.kind().is_float() {
        let v = value.to_f64();
        if v.is_nan() {
            return if T::KIND.is_float() {
                Ok(T::from_f64_in_range(v))
            } else {
                Err(ConversionFailure::ExceedsPositiveLimit)
            };
        }
        if v > T::HIGHEST.to_f64() {
            return Err(ConversionFailure::ExceedsPositiveLimit);
        }
        if v < T::LOWEST.to_f64() {
            return Err(ConversionFailure::ExceedsNegativeLimit);
        }
        return Ok(T::from_f64_in_range(v));
    }

    // Both sides are integers: compare in i64.
    let v = value.to_i64().unwrap_or_default();
    let highest = integer_limit(T::HIGHEST);
    let lowest = integer_limit(T::LOWEST);
    if v > highest {
        return Err(ConversionFailure::ExceedsPositiveLimit);
    }
    if v < lowest {
        return Err(ConversionFailure::ExceedsNegativeLimit);
    }
    Ok(T::from_i64_in_range(v))
}

fn integer_limit<T: Number>(limit: T) -> i64 {
    limit.into().to_i64().unwrap_or_default()
}

#[cfg(test)]
mod tests;
