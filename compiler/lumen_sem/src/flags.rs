//! Pre-computed type properties.
//!
//! Computed once when a type is interned so that queries such as "is this
//! type abstract?" or "can this type live in a uniform buffer?" never walk
//! the type.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u32 {
        // === Category Flags (bits 0-7) ===

        /// bool, i32, u32, f32, f16 or an abstract number.
        const IS_SCALAR = 1 << 0;
        /// Integer scalar (i32, u32, abstract-int).
        const IS_INTEGER = 1 << 1;
        /// Float scalar (f32, f16, abstract-float).
        const IS_FLOAT = 1 << 2;
        const IS_VECTOR = 1 << 3;
        const IS_MATRIX = 1 << 4;
        /// Samplers and textures.
        const IS_HANDLE = 1 << 5;
        /// Pointer or reference.
        const IS_MEMORY_VIEW = 1 << 6;

        // === Presence Flags (bits 8-15) ===
        // Propagate from element and member types to their containers.

        /// Contains abstract-int or abstract-float.
        const HAS_ABSTRACT = 1 << 8;
        /// Contains an atomic.
        const HAS_ATOMIC = 1 << 9;
        /// Contains a runtime-sized array.
        const HAS_RUNTIME_ARRAY = 1 << 10;
        /// Contains f16.
        const HAS_F16 = 1 << 11;

        // === Capability Flags (bits 16-23) ===

        /// Has a constructor (scalar, vector, matrix, fixed array, struct
        /// of constructible members).
        const IS_CONSTRUCTIBLE = 1 << 16;
        /// Has an identical layout on host and device.
        const IS_HOST_SHAREABLE = 1 << 17;
        /// Can be stored in memory: scalars, vectors, matrices, atomics,
        /// arrays and structs.
        const IS_STORABLE = 1 << 18;
    }
}

impl TypeFlags {
    /// Flags a container inherits from its element or members.
    pub const PROPAGATE_MASK: Self = Self::from_bits_truncate(
        Self::HAS_ABSTRACT.bits()
            | Self::HAS_ATOMIC.bits()
            | Self::HAS_RUNTIME_ARRAY.bits()
            | Self::HAS_F16.bits(),
    );

    #[inline]
    pub const fn is_abstract(self) -> bool {
        self.contains(Self::HAS_ABSTRACT)
    }

    #[inline]
    pub const fn is_constructible(self) -> bool {
        self.contains(Self::IS_CONSTRUCTIBLE)
    }

    #[inline]
    pub const fn is_host_shareable(self) -> bool {
        self.contains(Self::IS_HOST_SHAREABLE)
    }
}

#[cfg(test)]
mod tests;
