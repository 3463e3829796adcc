//! Semantic type pool.
//!
//! Types are interned: constructing the same vector, matrix, array, pointer
//! or texture twice yields the same [`Idx`]. Structs are nominal and always
//! get a fresh index.
//!
//! Layout (size and alignment) follows the host-shareable memory layout
//! rules: scalars are 4 bytes (f16 is 2), `vec3` aligns like `vec4`, a
//! matrix is laid out as an array of its column vectors.

mod format;
mod relations;

use lumen_ir::{
    Access, MemberId, Name, PipelineStage, SamplerKind, Span, StorageClass, StructDeclId,
    TexelFormat, TextureDimension,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Idx, TypeFlags};

/// Index of a struct in the pool's struct table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct StructId(u32);

impl StructId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element count of an array type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ArrayCount {
    Constant(u32),
    /// Runtime-sized: the last member of a storage buffer struct.
    Runtime,
}

/// Byte layout of an array type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayLayout {
    pub stride: u32,
    /// Stride implied by the element type alone.
    pub implicit_stride: u32,
    /// `max(count, 1) * stride`. May exceed `u32::MAX`; callers must check
    /// before interning.
    pub size: u64,
    pub align: u32,
}

/// Semantic type kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Void,
    Bool,
    I32,
    U32,
    F32,
    F16,
    AbstractInt,
    AbstractFloat,
    Vector {
        elem: Idx,
        width: u32,
    },
    Matrix {
        /// The column vector type, `vecR<elem>`.
        column: Idx,
        elem: Idx,
        columns: u32,
        rows: u32,
    },
    Array {
        elem: Idx,
        count: ArrayCount,
        stride: u32,
        implicit_stride: u32,
        size: u32,
        align: u32,
    },
    Atomic {
        elem: Idx,
    },
    Pointer {
        store: Idx,
        storage_class: StorageClass,
        access: Access,
    },
    /// The type of an expression naming memory: a variable, or an access
    /// into one.
    Reference {
        store: Idx,
        storage_class: StorageClass,
        access: Access,
    },
    Sampler(SamplerKind),
    SampledTexture {
        dim: TextureDimension,
        elem: Idx,
    },
    MultisampledTexture {
        dim: TextureDimension,
        elem: Idx,
    },
    DepthTexture {
        dim: TextureDimension,
    },
    DepthMultisampledTexture {
        dim: TextureDimension,
    },
    StorageTexture {
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    },
    ExternalTexture,
    Struct(StructId),
}

/// How a struct is used at an entry-point interface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PipelineStageUsage {
    VertexInput,
    VertexOutput,
    FragmentInput,
    FragmentOutput,
    ComputeInput,
    ComputeOutput,
}

impl PipelineStageUsage {
    pub const fn input(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::Vertex => PipelineStageUsage::VertexInput,
            PipelineStage::Fragment => PipelineStageUsage::FragmentInput,
            PipelineStage::Compute => PipelineStageUsage::ComputeInput,
        }
    }

    pub const fn output(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::Vertex => PipelineStageUsage::VertexOutput,
            PipelineStage::Fragment => PipelineStageUsage::FragmentOutput,
            PipelineStage::Compute => PipelineStageUsage::ComputeOutput,
        }
    }
}

/// A resolved struct member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructMember {
    pub decl: MemberId,
    pub name: Name,
    pub ty: Idx,
    pub index: u32,
    pub offset: u32,
    pub align: u32,
    pub size: u32,
    pub span: Span,
}

/// A resolved struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructType {
    pub decl: StructDeclId,
    pub name: Name,
    pub members: Vec<StructMember>,
    pub align: u32,
    pub size: u32,
    /// Offset of the end of the last member, before rounding up to `align`.
    pub size_no_padding: u32,
    pub span: Span,
    storage_class_usage: SmallVec<[StorageClass; 2]>,
    pipeline_stage_uses: SmallVec<[PipelineStageUsage; 2]>,
}

impl StructType {
    pub fn new(
        decl: StructDeclId,
        name: Name,
        members: Vec<StructMember>,
        align: u32,
        size: u32,
        size_no_padding: u32,
        span: Span,
    ) -> Self {
        StructType {
            decl,
            name,
            members,
            align,
            size,
            size_no_padding,
            span,
            storage_class_usage: SmallVec::new(),
            pipeline_stage_uses: SmallVec::new(),
        }
    }

    pub fn find_member(&self, name: Name) -> Option<&StructMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Record a storage class this struct is used in. Returns `false` if it
    /// was already recorded.
    pub fn add_usage(&mut self, storage_class: StorageClass) -> bool {
        if self.storage_class_usage.contains(&storage_class) {
            return false;
        }
        self.storage_class_usage.push(storage_class);
        true
    }

    pub fn is_used_in(&self, storage_class: StorageClass) -> bool {
        self.storage_class_usage.contains(&storage_class)
    }

    pub fn storage_class_usage(&self) -> &[StorageClass] {
        &self.storage_class_usage
    }

    pub fn add_pipeline_stage_use(&mut self, usage: PipelineStageUsage) {
        if !self.pipeline_stage_uses.contains(&usage) {
            self.pipeline_stage_uses.push(usage);
        }
    }

    pub fn pipeline_stage_uses(&self) -> &[PipelineStageUsage] {
        &self.pipeline_stage_uses
    }
}

#[derive(Copy, Clone, Debug)]
struct Item {
    kind: TypeKind,
    flags: TypeFlags,
}

/// Interning store for semantic types.
#[derive(Clone, Debug)]
pub struct Pool {
    items: Vec<Item>,
    intern_map: FxHashMap<TypeKind, Idx>,
    structs: Vec<StructType>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a pool with the primitive types at their fixed indices.
    pub fn new() -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(64),
            intern_map: FxHashMap::default(),
            structs: Vec::new(),
        };
        for kind in [
            TypeKind::Void,
            TypeKind::Bool,
            TypeKind::I32,
            TypeKind::U32,
            TypeKind::F32,
            TypeKind::F16,
            TypeKind::AbstractInt,
            TypeKind::AbstractFloat,
            TypeKind::Sampler(SamplerKind::Sampler),
            TypeKind::Sampler(SamplerKind::Comparison),
            TypeKind::ExternalTexture,
        ] {
            pool.intern(kind);
        }
        debug_assert_eq!(pool.items.len(), Idx::PRIMITIVE_COUNT as usize);
        pool
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "the pool never holds more than u32::MAX types"
    )]
    fn intern(&mut self, kind: TypeKind) -> Idx {
        if let Some(&idx) = self.intern_map.get(&kind) {
            return idx;
        }
        let flags = self.compute_flags(kind);
        let idx = Idx::from_raw(self.items.len() as u32);
        self.items.push(Item { kind, flags });
        self.intern_map.insert(kind, idx);
        idx
    }

    #[inline]
    pub fn kind(&self, idx: Idx) -> TypeKind {
        self.items
            .get(idx.index())
            .map_or(TypeKind::Void, |item| item.kind)
    }

    #[inline]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.items
            .get(idx.index())
            .map_or(TypeFlags::empty(), |item| item.flags)
    }

    fn compute_flags(&self, kind: TypeKind) -> TypeFlags {
        let scalar = TypeFlags::IS_SCALAR | TypeFlags::IS_CONSTRUCTIBLE;
        let concrete = scalar | TypeFlags::IS_STORABLE | TypeFlags::IS_HOST_SHAREABLE;
        match kind {
            TypeKind::Void => TypeFlags::empty(),
            TypeKind::Bool => scalar | TypeFlags::IS_STORABLE,
            TypeKind::I32 | TypeKind::U32 => concrete | TypeFlags::IS_INTEGER,
            TypeKind::F32 => concrete | TypeFlags::IS_FLOAT,
            TypeKind::F16 => concrete | TypeFlags::IS_FLOAT | TypeFlags::HAS_F16,
            TypeKind::AbstractInt => scalar | TypeFlags::IS_INTEGER | TypeFlags::HAS_ABSTRACT,
            TypeKind::AbstractFloat => scalar | TypeFlags::IS_FLOAT | TypeFlags::HAS_ABSTRACT,
            TypeKind::Vector { elem, .. } => {
                self.composite_flags(elem, TypeFlags::IS_VECTOR | TypeFlags::IS_CONSTRUCTIBLE)
            }
            TypeKind::Matrix { elem, .. } => {
                self.composite_flags(elem, TypeFlags::IS_MATRIX | TypeFlags::IS_CONSTRUCTIBLE)
            }
            TypeKind::Array { elem, count, .. } => match count {
                ArrayCount::Constant(_) => self.composite_flags(
                    elem,
                    self.flags(elem) & TypeFlags::IS_CONSTRUCTIBLE,
                ),
                ArrayCount::Runtime => {
                    self.composite_flags(elem, TypeFlags::HAS_RUNTIME_ARRAY)
                }
            },
            TypeKind::Atomic { .. } => {
                TypeFlags::HAS_ATOMIC | TypeFlags::IS_HOST_SHAREABLE | TypeFlags::IS_STORABLE
            }
            TypeKind::Pointer { .. } | TypeKind::Reference { .. } => TypeFlags::IS_MEMORY_VIEW,
            TypeKind::Sampler(_)
            | TypeKind::SampledTexture { .. }
            | TypeKind::MultisampledTexture { .. }
            | TypeKind::DepthTexture { .. }
            | TypeKind::DepthMultisampledTexture { .. }
            | TypeKind::StorageTexture { .. }
            | TypeKind::ExternalTexture => TypeFlags::IS_HANDLE,
            TypeKind::Struct(id) => self.struct_flags(&self.structs[id.index()]),
        }
    }

    /// Flags of a container around `elem`: propagated presence flags, plus
    /// host-shareability inherited from the element.
    fn composite_flags(&self, elem: Idx, own: TypeFlags) -> TypeFlags {
        let elem_flags = self.flags(elem);
        let mut flags = own | TypeFlags::IS_STORABLE | (elem_flags & TypeFlags::PROPAGATE_MASK);
        if elem_flags.is_host_shareable() {
            flags |= TypeFlags::IS_HOST_SHAREABLE;
        }
        flags
    }

    fn struct_flags(&self, st: &StructType) -> TypeFlags {
        let mut flags =
            TypeFlags::IS_STORABLE | TypeFlags::IS_CONSTRUCTIBLE | TypeFlags::IS_HOST_SHAREABLE;
        for member in &st.members {
            let member_flags = self.flags(member.ty);
            flags |= member_flags & TypeFlags::PROPAGATE_MASK;
            if !member_flags.is_constructible() {
                flags.remove(TypeFlags::IS_CONSTRUCTIBLE);
            }
            if !member_flags.is_host_shareable() {
                flags.remove(TypeFlags::IS_HOST_SHAREABLE);
            }
        }
        flags
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn vector(&mut self, elem: Idx, width: u32) -> Idx {
        self.intern(TypeKind::Vector { elem, width })
    }

    /// `matCxR<elem>`, interning the column vector `vecR<elem>` as well.
    pub fn matrix(&mut self, elem: Idx, columns: u32, rows: u32) -> Idx {
        let column = self.vector(elem, rows);
        self.intern(TypeKind::Matrix {
            column,
            elem,
            columns,
            rows,
        })
    }

    /// Layout of `array<elem, count>` with an optional explicit stride.
    ///
    /// The implicit stride is the element size rounded up to the element
    /// alignment.
    pub fn array_layout(
        &self,
        elem: Idx,
        count: ArrayCount,
        explicit_stride: Option<u32>,
    ) -> ArrayLayout {
        let el_size = self.size(elem);
        let el_align = self.align(elem);
        let implicit_stride = if el_size == 0 {
            0
        } else {
            round_up(el_align, el_size)
        };
        let stride = explicit_stride.unwrap_or(implicit_stride);
        let count = match count {
            ArrayCount::Constant(n) => n.max(1),
            ArrayCount::Runtime => 1,
        };
        ArrayLayout {
            stride,
            implicit_stride,
            size: u64::from(count) * u64::from(stride),
            align: el_align,
        }
    }

    /// Intern an array type with a precomputed layout whose size fits in
    /// 32 bits. Oversized layouts are clamped to `u32::MAX`.
    pub fn array(&mut self, elem: Idx, count: ArrayCount, layout: ArrayLayout) -> Idx {
        self.intern(TypeKind::Array {
            elem,
            count,
            stride: layout.stride,
            implicit_stride: layout.implicit_stride,
            size: u32::try_from(layout.size).unwrap_or(u32::MAX),
            align: layout.align,
        })
    }

    /// `array<elem, count>` with implicit stride.
    pub fn array_of(&mut self, elem: Idx, count: ArrayCount) -> Idx {
        let layout = self.array_layout(elem, count, None);
        self.array(elem, count, layout)
    }

    pub fn atomic(&mut self, elem: Idx) -> Idx {
        self.intern(TypeKind::Atomic { elem })
    }

    pub fn pointer(&mut self, store: Idx, storage_class: StorageClass, access: Access) -> Idx {
        self.intern(TypeKind::Pointer {
            store,
            storage_class,
            access,
        })
    }

    pub fn reference(&mut self, store: Idx, storage_class: StorageClass, access: Access) -> Idx {
        self.intern(TypeKind::Reference {
            store,
            storage_class,
            access,
        })
    }

    pub fn sampler(&self, kind: SamplerKind) -> Idx {
        match kind {
            SamplerKind::Sampler => Idx::SAMPLER,
            SamplerKind::Comparison => Idx::SAMPLER_COMPARISON,
        }
    }

    pub fn sampled_texture(&mut self, dim: TextureDimension, elem: Idx) -> Idx {
        self.intern(TypeKind::SampledTexture { dim, elem })
    }

    pub fn multisampled_texture(&mut self, dim: TextureDimension, elem: Idx) -> Idx {
        self.intern(TypeKind::MultisampledTexture { dim, elem })
    }

    pub fn depth_texture(&mut self, dim: TextureDimension) -> Idx {
        self.intern(TypeKind::DepthTexture { dim })
    }

    pub fn depth_multisampled_texture(&mut self, dim: TextureDimension) -> Idx {
        self.intern(TypeKind::DepthMultisampledTexture { dim })
    }

    pub fn storage_texture(
        &mut self,
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    ) -> Idx {
        self.intern(TypeKind::StorageTexture {
            dim,
            format,
            access,
        })
    }

    /// Add a struct. Structs are nominal, so this always creates a new type.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the struct table never exceeds u32::MAX entries"
    )]
    pub fn add_struct(&mut self, st: StructType) -> Idx {
        let id = StructId(self.structs.len() as u32);
        self.structs.push(st);
        self.intern(TypeKind::Struct(id))
    }

    #[inline]
    pub fn struct_type(&self, id: StructId) -> &StructType {
        &self.structs[id.index()]
    }

    #[inline]
    pub fn struct_type_mut(&mut self, id: StructId) -> &mut StructType {
        &mut self.structs[id.index()]
    }

    pub fn struct_id(&self, idx: Idx) -> Option<StructId> {
        match self.kind(idx) {
            TypeKind::Struct(id) => Some(id),
            _ => None,
        }
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructType> {
        self.structs.iter()
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Size in bytes. Zero for types without a memory layout.
    pub fn size(&self, idx: Idx) -> u32 {
        match self.kind(idx) {
            TypeKind::Bool | TypeKind::I32 | TypeKind::U32 | TypeKind::F32 => 4,
            TypeKind::F16 => 2,
            TypeKind::Vector { elem, width } => width * self.size(elem),
            TypeKind::Matrix {
                column, columns, ..
            } => columns * self.align(column),
            TypeKind::Array { size, .. } => size,
            TypeKind::Atomic { elem } => self.size(elem),
            TypeKind::Struct(id) => self.structs[id.index()].size,
            _ => 0,
        }
    }

    /// Alignment in bytes. Zero for types without a memory layout.
    pub fn align(&self, idx: Idx) -> u32 {
        match self.kind(idx) {
            TypeKind::Bool | TypeKind::I32 | TypeKind::U32 | TypeKind::F32 => 4,
            TypeKind::F16 => 2,
            TypeKind::Vector { elem, width } => {
                let el = self.size(elem);
                if width == 2 {
                    2 * el
                } else {
                    4 * el
                }
            }
            TypeKind::Matrix { column, .. } => self.align(column),
            TypeKind::Array { align, .. } => align,
            TypeKind::Atomic { elem } => self.align(elem),
            TypeKind::Struct(id) => self.structs[id.index()].align,
            _ => 0,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The stored type of a reference, or `idx` itself.
    pub fn unwrap_ref(&self, idx: Idx) -> Idx {
        match self.kind(idx) {
            TypeKind::Reference { store, .. } => store,
            _ => idx,
        }
    }

    /// The pointee of a pointer or reference.
    pub fn store_type(&self, idx: Idx) -> Option<Idx> {
        match self.kind(idx) {
            TypeKind::Reference { store, .. } | TypeKind::Pointer { store, .. } => Some(store),
            _ => None,
        }
    }

    /// Element type of a vector, matrix (its column) or array.
    pub fn elem_of(&self, idx: Idx) -> Option<Idx> {
        match self.kind(idx) {
            TypeKind::Vector { elem, .. } | TypeKind::Array { elem, .. } => Some(elem),
            TypeKind::Matrix { column, .. } => Some(column),
            _ => None,
        }
    }

    /// Innermost element: the scalar of a vector or matrix, recursively
    /// through arrays. Other types are their own deepest element.
    pub fn deepest_element(&self, idx: Idx) -> Idx {
        match self.kind(idx) {
            TypeKind::Vector { elem, .. } | TypeKind::Matrix { elem, .. } => elem,
            TypeKind::Array { elem, .. } => self.deepest_element(elem),
            _ => idx,
        }
    }

    /// Number of elements of a vector, matrix (columns) or sized array.
    pub fn element_count(&self, idx: Idx) -> Option<u32> {
        match self.kind(idx) {
            TypeKind::Vector { width, .. } => Some(width),
            TypeKind::Matrix { columns, .. } => Some(columns),
            TypeKind::Array {
                count: ArrayCount::Constant(n),
                ..
            } => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn is_abstract(&self, idx: Idx) -> bool {
        self.flags(idx).is_abstract()
    }

    #[inline]
    pub fn is_scalar(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_SCALAR)
    }

    /// Scalar other than bool.
    pub fn is_numeric_scalar(&self, idx: Idx) -> bool {
        self.is_scalar(idx) && idx != Idx::BOOL
    }

    /// i32, u32 or abstract-int.
    #[inline]
    pub fn is_integer_scalar(&self, idx: Idx) -> bool {
        self.flags(idx)
            .contains(TypeFlags::IS_SCALAR | TypeFlags::IS_INTEGER)
    }

    /// f32, f16 or abstract-float.
    #[inline]
    pub fn is_float_scalar(&self, idx: Idx) -> bool {
        self.flags(idx)
            .contains(TypeFlags::IS_SCALAR | TypeFlags::IS_FLOAT)
    }

    #[inline]
    pub fn is_vector(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_VECTOR)
    }

    #[inline]
    pub fn is_matrix(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_MATRIX)
    }

    #[inline]
    pub fn is_handle(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_HANDLE)
    }

    #[inline]
    pub fn is_constructible(&self, idx: Idx) -> bool {
        self.flags(idx).is_constructible()
    }

    #[inline]
    pub fn is_host_shareable(&self, idx: Idx) -> bool {
        self.flags(idx).is_host_shareable()
    }

    #[inline]
    pub fn is_storable(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_STORABLE)
    }

    #[inline]
    pub fn is_atomic(&self, idx: Idx) -> bool {
        matches!(self.kind(idx), TypeKind::Atomic { .. })
    }

    /// Scalar, or vector of scalar, whose deepest element satisfies `pred`.
    pub fn is_scalar_or_vector_of(&self, idx: Idx, pred: impl Fn(Idx) -> bool) -> bool {
        match self.kind(idx) {
            TypeKind::Vector { elem, .. } => pred(elem),
            _ => self.is_scalar(idx) && pred(idx),
        }
    }

    pub fn is_runtime_array(&self, idx: Idx) -> bool {
        matches!(
            self.kind(idx),
            TypeKind::Array {
                count: ArrayCount::Runtime,
                ..
            }
        )
    }
}

/// Round `value` up to a multiple of `alignment`. Zero alignment leaves
/// the value unchanged.
pub fn round_up(alignment: u32, value: u32) -> u32 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

/// 64-bit [`round_up`], for layout sums that may exceed 32 bits.
pub fn round_up_u64(alignment: u64, value: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests;
