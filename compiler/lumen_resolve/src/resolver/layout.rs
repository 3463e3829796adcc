//! Struct declarations, member layout and storage-class usage.

use lumen_diagnostic::ErrorCode;
use lumen_ir::{AttributeKind, Span, StorageClass, StructDeclId};
use lumen_sem::{round_up_u64, ArrayCount, Idx, StructMember, StructType, TypeKind};
use lumen_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use super::Resolver;
use crate::error::ResolveResult;

impl Resolver<'_> {
    /// Resolve a struct declaration and compute its memory layout.
    ///
    /// Members are placed at the running size rounded up to their alignment.
    /// `@offset` pins a member (and drops its alignment to 1), `@align` and
    /// `@size` override the type's natural values.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(super) fn structure(&mut self, id: StructDeclId) -> ResolveResult {
        let module = self.module;
        let decl = module.struct_decl(id);
        self.mark(decl.id)?;

        self.validator()
            .attributes(&decl.attrs, "structure declarations", |_| false)?;
        for &attr in &decl.attrs {
            self.mark(module.attr(attr).id)?;
        }
        if decl.members.is_empty() {
            return Err(self.error(
                ErrorCode::E2004,
                "structures must have at least one member",
                decl.span,
            ));
        }

        let mut seen: FxHashMap<lumen_ir::Name, Span> = FxHashMap::default();
        let mut members = Vec::with_capacity(decl.members.len());
        let mut struct_size: u64 = 0;
        let mut struct_align: u32 = 1;

        for (index, &member_id) in decl.members.iter().enumerate() {
            let member = module.member(member_id);
            self.mark(member.id)?;

            if let Some(&previous) = seen.get(&member.name) {
                let name = self.name(member.name);
                self.validator()
                    .duplicate_name("struct member", name, member.span, previous)?;
            }
            seen.insert(member.name, member.span);

            let ty = self.resolve_type(member.ty)?;
            let is_last = index + 1 == decl.members.len();
            self.validator()
                .struct_member_type(ty, is_last, member.span)?;
            self.validator()
                .attributes(&member.attrs, "structure members", |kind| {
                    matches!(
                        kind,
                        AttributeKind::Offset(_)
                            | AttributeKind::Align(_)
                            | AttributeKind::Size(_)
                            | AttributeKind::Builtin(_)
                            | AttributeKind::Location(_)
                            | AttributeKind::Invariant
                    )
                })?;

            let mut offset = struct_size;
            let mut align = self.pool().align(ty);
            let mut size = self.pool().size(ty);
            let mut has_offset = false;
            let mut has_align_or_size = false;
            for &attr_id in &member.attrs {
                let attr = module.attr(attr_id);
                self.mark(attr.id)?;
                match attr.kind {
                    AttributeKind::Offset(value) => {
                        self.validator()
                            .member_offset(value, struct_size, attr.span)?;
                        offset = u64::from(value);
                        align = 1;
                        has_offset = true;
                    }
                    AttributeKind::Align(value) => {
                        self.validator().member_align(value, attr.span)?;
                        align = value;
                        has_align_or_size = true;
                    }
                    AttributeKind::Size(value) => {
                        let natural = self.pool().size(ty);
                        self.validator().member_size(value, natural, attr.span)?;
                        size = value;
                        has_align_or_size = true;
                    }
                    _ => {}
                }
            }
            if has_offset && has_align_or_size {
                return Err(self.error(
                    ErrorCode::E2011,
                    "offset attributes can not be used with align or size attributes",
                    member.span,
                ));
            }

            let offset = round_up_u64(u64::from(align), offset);
            self.validator()
                .byte_limit("struct member offset", offset, member.span)?;
            let offset = u32::try_from(offset).unwrap_or(u32::MAX);

            #[expect(
                clippy::cast_possible_truncation,
                reason = "struct member count is bounded by the node id space"
            )]
            let index = index as u32;
            members.push(StructMember {
                decl: member_id,
                name: member.name,
                ty,
                index,
                offset,
                align,
                size,
                span: member.span,
            });
            struct_size = u64::from(offset) + u64::from(size);
            struct_align = struct_align.max(align);
        }

        let size_no_padding = struct_size;
        let struct_size = round_up_u64(u64::from(struct_align), struct_size);
        self.validator()
            .byte_limit("struct size", struct_size, decl.span)?;

        let ty = self.graph.types.add_struct(StructType::new(
            id,
            decl.name,
            members,
            struct_align,
            u32::try_from(struct_size).unwrap_or(u32::MAX),
            u32::try_from(size_no_padding).unwrap_or(u32::MAX),
            decl.span,
        ));
        self.graph.set_struct_for(id, ty);
        tracing::trace!(
            name = self.name(decl.name),
            size = struct_size,
            align = struct_align,
            "struct laid out"
        );
        Ok(())
    }

    // ========================================================================
    // Storage-Class Usage
    // ========================================================================

    /// Record that `ty` is used in `storage_class`, recursing through
    /// structs and arrays, and check host-shareability where required.
    pub(super) fn apply_storage_class_usage(
        &mut self,
        storage_class: StorageClass,
        ty: Idx,
        span: Span,
    ) -> ResolveResult {
        ensure_sufficient_stack(|| self.apply_storage_class_usage_inner(storage_class, ty, span))
    }

    fn apply_storage_class_usage_inner(
        &mut self,
        storage_class: StorageClass,
        ty: Idx,
        span: Span,
    ) -> ResolveResult {
        let ty = self.pool().unwrap_ref(ty);
        match self.pool().kind(ty) {
            TypeKind::Struct(id) => {
                if !self.graph.types.struct_type_mut(id).add_usage(storage_class) {
                    return Ok(());
                }
                let members: Vec<(Idx, Span, lumen_ir::Name)> = self
                    .pool()
                    .struct_type(id)
                    .members
                    .iter()
                    .map(|m| (m.ty, m.span, m.name))
                    .collect();
                let struct_name = self.pool().struct_type(id).name;
                for (member_ty, member_span, member_name) in members {
                    if let Err(halt) =
                        self.apply_storage_class_usage(storage_class, member_ty, member_span)
                    {
                        let note = format!(
                            "while analysing structure member {}.{}",
                            self.name(struct_name),
                            self.name(member_name)
                        );
                        self.note(note, member_span);
                        return Err(halt);
                    }
                }
                Ok(())
            }
            TypeKind::Array { elem, count, .. } => {
                if count == ArrayCount::Runtime && storage_class != StorageClass::Storage {
                    return Err(self.error(
                        ErrorCode::E2012,
                        format!(
                            "runtime-sized arrays can only be used in the <storage> storage \
                             class, not '{storage_class}'"
                        ),
                        span,
                    ));
                }
                self.apply_storage_class_usage(storage_class, elem, span)
            }
            _ if storage_class.is_host_shareable() && !self.pool().is_host_shareable(ty) => {
                Err(self.error(
                    ErrorCode::E2012,
                    format!(
                        "Type '{}' cannot be used in storage class '{storage_class}' as it is \
                         non-host-shareable",
                        self.type_name(ty)
                    ),
                    span,
                ))
            }
            _ => Ok(()),
        }
    }
}
