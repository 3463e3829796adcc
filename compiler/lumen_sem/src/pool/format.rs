//! Type names for diagnostics.

#![allow(clippy::format_push_string)] // Diagnostic formatting prioritizes clarity over allocation

use lumen_ir::{SamplerKind, StringInterner};

use super::{ArrayCount, Pool, TypeKind};
use crate::Idx;

impl Pool {
    /// Format a type the way it is spelled in source.
    pub fn display(&self, idx: Idx, interner: &StringInterner) -> String {
        let mut buf = String::new();
        self.display_into(idx, interner, &mut buf);
        buf
    }

    fn display_into(&self, idx: Idx, interner: &StringInterner, buf: &mut String) {
        match self.kind(idx) {
            TypeKind::Void => buf.push_str("void"),
            TypeKind::Bool => buf.push_str("bool"),
            TypeKind::I32 => buf.push_str("i32"),
            TypeKind::U32 => buf.push_str("u32"),
            TypeKind::F32 => buf.push_str("f32"),
            TypeKind::F16 => buf.push_str("f16"),
            TypeKind::AbstractInt => buf.push_str("abstract-int"),
            TypeKind::AbstractFloat => buf.push_str("abstract-float"),
            TypeKind::Vector { elem, width } => {
                buf.push_str(&format!("vec{width}<"));
                self.display_into(elem, interner, buf);
                buf.push('>');
            }
            TypeKind::Matrix {
                elem,
                columns,
                rows,
                ..
            } => {
                buf.push_str(&format!("mat{columns}x{rows}<"));
                self.display_into(elem, interner, buf);
                buf.push('>');
            }
            TypeKind::Array {
                elem,
                count,
                stride,
                implicit_stride,
                ..
            } => {
                if stride != implicit_stride {
                    buf.push_str(&format!("@stride({stride}) "));
                }
                buf.push_str("array<");
                self.display_into(elem, interner, buf);
                if let ArrayCount::Constant(n) = count {
                    buf.push_str(&format!(", {n}"));
                }
                buf.push('>');
            }
            TypeKind::Atomic { elem } => {
                buf.push_str("atomic<");
                self.display_into(elem, interner, buf);
                buf.push('>');
            }
            TypeKind::Pointer {
                store,
                storage_class,
                access,
            } => {
                buf.push_str(&format!("ptr<{storage_class}, "));
                self.display_into(store, interner, buf);
                buf.push_str(&format!(", {access}>"));
            }
            TypeKind::Reference {
                store,
                storage_class,
                access,
            } => {
                buf.push_str(&format!("ref<{storage_class}, "));
                self.display_into(store, interner, buf);
                buf.push_str(&format!(", {access}>"));
            }
            TypeKind::Sampler(SamplerKind::Sampler) => buf.push_str("sampler"),
            TypeKind::Sampler(SamplerKind::Comparison) => buf.push_str("sampler_comparison"),
            TypeKind::SampledTexture { dim, elem } => {
                buf.push_str(&format!("texture_{dim}<"));
                self.display_into(elem, interner, buf);
                buf.push('>');
            }
            TypeKind::MultisampledTexture { dim, elem } => {
                buf.push_str(&format!("texture_multisampled_{dim}<"));
                self.display_into(elem, interner, buf);
                buf.push('>');
            }
            TypeKind::DepthTexture { dim } => buf.push_str(&format!("texture_depth_{dim}")),
            TypeKind::DepthMultisampledTexture { dim } => {
                buf.push_str(&format!("texture_depth_multisampled_{dim}"));
            }
            TypeKind::StorageTexture {
                dim,
                format,
                access,
            } => buf.push_str(&format!("texture_storage_{dim}<{format}, {access}>")),
            TypeKind::ExternalTexture => buf.push_str("texture_external"),
            TypeKind::Struct(id) => buf.push_str(interner.lookup(self.struct_type(id).name)),
        }
    }
}
