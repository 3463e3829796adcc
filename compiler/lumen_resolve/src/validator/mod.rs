//! Rule checks invoked by the resolver.
//!
//! The validator never builds semantic entities. Each check looks at types
//! and entities the resolver already produced, reports a diagnostic when a
//! rule is broken, and returns the guarantee so the resolver can stop the
//! offending declaration.
//!
//! ```text
//! mod.rs     attributes, type legality, materialization
//! decls.rs   variables, parameters, structs, overrides
//! stmts.rs   control flow, assignments, switches, reachability
//! entry.rs   entry point interfaces and pipeline stages
//! ```

mod decls;
mod entry;
mod stmts;

use lumen_diagnostic::{DiagnosticSink, ErrorCode, ErrorGuaranteed};
use lumen_ir::{
    Access, AttrId, AttributeKind, Extension, Module, Name, Span, StringInterner,
    TextureDimension,
};
use lumen_sem::{Idx, Pool, SemGraph, TypeFlags, TypeKind};
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) use decls::VarSyntax;
pub(crate) use stmts::SwitchCase;

/// Result of a single rule check.
pub(crate) type Valid = Result<(), ErrorGuaranteed>;

pub(crate) struct Validator<'a> {
    module: &'a Module,
    interner: &'a StringInterner,
    graph: &'a SemGraph,
    sink: &'a mut DiagnosticSink,
    enabled: &'a FxHashSet<Extension>,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(
        module: &'a Module,
        interner: &'a StringInterner,
        graph: &'a SemGraph,
        sink: &'a mut DiagnosticSink,
        enabled: &'a FxHashSet<Extension>,
    ) -> Self {
        Validator {
            module,
            interner,
            graph,
            sink,
            enabled,
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn pool(&self) -> &Pool {
        &self.graph.types
    }

    fn type_name(&self, ty: Idx) -> String {
        self.graph.types.display(ty, self.interner)
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) -> ErrorGuaranteed {
        self.sink.add_error(code, message, span)
    }

    fn note(&mut self, message: impl Into<String>, span: Span) {
        self.sink.add_note(message, span);
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Reject attributes `allowed` refuses and attributes given twice.
    pub(crate) fn attributes(
        &mut self,
        attrs: &[AttrId],
        context: &str,
        allowed: impl Fn(&AttributeKind) -> bool,
    ) -> Valid {
        let mut seen: FxHashMap<&'static str, Span> = FxHashMap::default();
        for &id in attrs {
            let attr = self.module.attr(id);
            let name = attr.kind.name();
            if !allowed(&attr.kind) {
                return Err(self.error(
                    ErrorCode::E2005,
                    format!("attribute '@{name}' is not valid for {context}"),
                    attr.span,
                ));
            }
            if let Some(&first) = seen.get(name) {
                let guarantee = self.error(
                    ErrorCode::E2005,
                    format!("duplicate {name} attribute"),
                    attr.span,
                );
                self.note("first attribute declared here", first);
                return Err(guarantee);
            }
            seen.insert(name, attr.span);
        }
        Ok(())
    }

    // ========================================================================
    // Extensions
    // ========================================================================

    pub(crate) fn require_extension(&mut self, extension: Extension, what: &str, span: Span) -> Valid {
        if self.enabled.contains(&extension) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2003,
            format!("{what} used without '{extension}' extension enabled"),
            span,
        ))
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub(crate) fn vector_elem(&mut self, elem: Idx, span: Span) -> Valid {
        let pool = self.pool();
        if pool.is_scalar(elem) && !pool.is_abstract(elem) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2002,
            "vector element type must be 'bool', 'f32', 'f16', 'i32' or 'u32'",
            span,
        ))
    }

    pub(crate) fn matrix_elem(&mut self, elem: Idx, span: Span) -> Valid {
        if elem == Idx::F32 || elem == Idx::F16 {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2002,
            "matrix element type must be 'f32' or 'f16'",
            span,
        ))
    }

    pub(crate) fn atomic_elem(&mut self, elem: Idx, span: Span) -> Valid {
        if elem == Idx::I32 || elem == Idx::U32 {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2002,
            "atomic only supports i32 or u32 types",
            span,
        ))
    }

    pub(crate) fn sampled_texture_elem(&mut self, elem: Idx, span: Span) -> Valid {
        if matches!(elem, Idx::F32 | Idx::I32 | Idx::U32) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2002,
            format!(
                "texture element type must be 'f32', 'i32' or 'u32', found '{}'",
                self.type_name(elem)
            ),
            span,
        ))
    }

    pub(crate) fn multisampled_texture_dim(&mut self, dim: TextureDimension, span: Span) -> Valid {
        if dim == TextureDimension::D2 {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2002,
            "only 2d multisampled textures are supported",
            span,
        ))
    }

    pub(crate) fn storage_texture_access(&mut self, access: Access, span: Span) -> Valid {
        if matches!(access, Access::Read | Access::Write) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2002,
            "storage textures currently only support 'read' or 'write' access control",
            span,
        ))
    }

    pub(crate) fn array_elem(&mut self, elem: Idx, span: Span) -> Valid {
        let flags = self.pool().flags(elem);
        if flags.contains(TypeFlags::HAS_RUNTIME_ARRAY) {
            return Err(self.error(
                ErrorCode::E2002,
                "an array element type cannot contain a runtime-sized array",
                span,
            ));
        }
        if !flags.contains(TypeFlags::IS_STORABLE) {
            return Err(self.error(
                ErrorCode::E2002,
                format!(
                    "'{}' cannot be used as an element type of an array",
                    self.type_name(elem)
                ),
                span,
            ));
        }
        Ok(())
    }

    pub(crate) fn array_stride(&mut self, elem: Idx, stride: u32, span: Span) -> Valid {
        let pool = self.pool();
        let el_size = pool.size(elem);
        let el_align = pool.align(elem).max(1);
        if stride >= el_size && stride % el_align == 0 {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2011,
            "arrays decorated with the stride attribute must have a stride that is at least \
             the size of the element type, and be a multiple of the element type's alignment value",
            span,
        ))
    }

    pub(crate) fn pointer_store(&mut self, store: Idx, span: Span) -> Valid {
        if self.pool().is_storable(store) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2002,
            format!("ptr store type must be storable, found '{}'", self.type_name(store)),
            span,
        ))
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// An abstract value of type `from` can only become a `to`.
    pub(crate) fn materialize(&mut self, from: Idx, to: Idx, span: Span) -> Valid {
        if self.pool().conversion_rank(from, to).is_some() {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2001,
            format!(
                "cannot convert value of type '{}' to type '{}'",
                self.type_name(from),
                self.type_name(to)
            ),
            span,
        ))
    }

    /// Bitcasts reinterpret 32-bit scalars and vectors of the same width.
    pub(crate) fn bitcast(&mut self, from: Idx, to: Idx, span: Span) -> Valid {
        let pool = self.pool();
        let shape = |ty: Idx| match pool.kind(ty) {
            TypeKind::Vector { elem, width } => Some((elem, width)),
            _ if pool.is_scalar(ty) => Some((ty, 1)),
            _ => None,
        };
        let numeric32 = |ty: Idx| matches!(ty, Idx::I32 | Idx::U32 | Idx::F32);
        let ok = match (shape(from), shape(to)) {
            (Some((from_el, from_n)), Some((to_el, to_n))) => {
                from_n == to_n && numeric32(from_el) && numeric32(to_el)
            }
            _ => false,
        };
        if ok {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2001,
            format!(
                "cannot bitcast from '{}' to '{}'",
                self.type_name(from),
                self.type_name(to)
            ),
            span,
        ))
    }
}

#[cfg(test)]
mod tests;
