//! Builtin functions known to the compiler.

use std::fmt;

/// A builtin function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum BuiltinFn {
    Abs,
    Min,
    Max,
    Clamp,
    Dot,
    Select,
    All,
    Any,
    Length,
    Dpdx,
    /// Deprecated spelling kept for compatibility.
    IsNan,
    ArrayLength,
    TextureSample,
    TextureLoad,
    TextureDimensions,
    TextureStore,
    WorkgroupBarrier,
    StorageBarrier,
    AtomicLoad,
    AtomicStore,
    AtomicAdd,
}

impl BuiltinFn {
    pub const ALL: [BuiltinFn; 21] = [
        BuiltinFn::Abs,
        BuiltinFn::Min,
        BuiltinFn::Max,
        BuiltinFn::Clamp,
        BuiltinFn::Dot,
        BuiltinFn::Select,
        BuiltinFn::All,
        BuiltinFn::Any,
        BuiltinFn::Length,
        BuiltinFn::Dpdx,
        BuiltinFn::IsNan,
        BuiltinFn::ArrayLength,
        BuiltinFn::TextureSample,
        BuiltinFn::TextureLoad,
        BuiltinFn::TextureDimensions,
        BuiltinFn::TextureStore,
        BuiltinFn::WorkgroupBarrier,
        BuiltinFn::StorageBarrier,
        BuiltinFn::AtomicLoad,
        BuiltinFn::AtomicStore,
        BuiltinFn::AtomicAdd,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BuiltinFn::Abs => "abs",
            BuiltinFn::Min => "min",
            BuiltinFn::Max => "max",
            BuiltinFn::Clamp => "clamp",
            BuiltinFn::Dot => "dot",
            BuiltinFn::Select => "select",
            BuiltinFn::All => "all",
            BuiltinFn::Any => "any",
            BuiltinFn::Length => "length",
            BuiltinFn::Dpdx => "dpdx",
            BuiltinFn::IsNan => "isNan",
            BuiltinFn::ArrayLength => "arrayLength",
            BuiltinFn::TextureSample => "textureSample",
            BuiltinFn::TextureLoad => "textureLoad",
            BuiltinFn::TextureDimensions => "textureDimensions",
            BuiltinFn::TextureStore => "textureStore",
            BuiltinFn::WorkgroupBarrier => "workgroupBarrier",
            BuiltinFn::StorageBarrier => "storageBarrier",
            BuiltinFn::AtomicLoad => "atomicLoad",
            BuiltinFn::AtomicStore => "atomicStore",
            BuiltinFn::AtomicAdd => "atomicAdd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub const fn is_deprecated(self) -> bool {
        matches!(self, BuiltinFn::IsNan)
    }

    pub const fn is_texture(self) -> bool {
        matches!(
            self,
            BuiltinFn::TextureSample
                | BuiltinFn::TextureLoad
                | BuiltinFn::TextureDimensions
                | BuiltinFn::TextureStore
        )
    }

    pub const fn is_atomic(self) -> bool {
        matches!(
            self,
            BuiltinFn::AtomicLoad | BuiltinFn::AtomicStore | BuiltinFn::AtomicAdd
        )
    }

    /// Calls with side effects cannot be dropped.
    pub const fn has_side_effects(self) -> bool {
        matches!(
            self,
            BuiltinFn::TextureStore
                | BuiltinFn::WorkgroupBarrier
                | BuiltinFn::StorageBarrier
                | BuiltinFn::AtomicStore
                | BuiltinFn::AtomicAdd
        )
    }

    /// Must only be called from uniform control flow.
    pub const fn requires_uniformity(self) -> bool {
        matches!(
            self,
            BuiltinFn::WorkgroupBarrier
                | BuiltinFn::StorageBarrier
                | BuiltinFn::TextureSample
                | BuiltinFn::Dpdx
        )
    }

    /// Has a constant evaluator.
    pub const fn is_const(self) -> bool {
        matches!(
            self,
            BuiltinFn::Abs
                | BuiltinFn::Min
                | BuiltinFn::Max
                | BuiltinFn::Clamp
                | BuiltinFn::Dot
                | BuiltinFn::Select
                | BuiltinFn::All
                | BuiltinFn::Any
        )
    }
}

impl fmt::Display for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests;
