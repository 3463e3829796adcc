//! Type handle.
//!
//! All semantic types live in a [`Pool`](crate::Pool) and are referred to by
//! a 32-bit `Idx`. Interning makes structurally equal types share one index,
//! so type equality is index equality.
//!
//! Scalar and handle types without parameters are pre-interned at fixed
//! indices.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Pre-interned Types (indices 0-10) ===

    pub const VOID: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const I32: Self = Self(2);
    pub const U32: Self = Self(3);
    pub const F32: Self = Self(4);
    pub const F16: Self = Self(5);
    /// Type of unsuffixed integer literals.
    pub const ABSTRACT_INT: Self = Self(6);
    /// Type of unsuffixed float literals.
    pub const ABSTRACT_FLOAT: Self = Self(7);
    pub const SAMPLER: Self = Self(8);
    pub const SAMPLER_COMPARISON: Self = Self(9);
    pub const EXTERNAL_TEXTURE: Self = Self(10);

    /// Number of pre-interned types.
    pub const PRIMITIVE_COUNT: u32 = 11;

    /// Sentinel for "no type".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Name of a pre-interned type, `None` for the rest.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("void"),
            1 => Some("bool"),
            2 => Some("i32"),
            3 => Some("u32"),
            4 => Some("f32"),
            5 => Some("f16"),
            6 => Some("abstract-int"),
            7 => Some("abstract-float"),
            8 => Some("sampler"),
            9 => Some("sampler_comparison"),
            10 => Some("texture_external"),
            _ => None,
        }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Idx({name})"),
            None if self.is_none() => write!(f, "Idx(NONE)"),
            None => write!(f, "Idx({})", self.0),
        }
    }
}

impl Default for Idx {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests;
