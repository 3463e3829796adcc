//! Declaration rules: variables, parameters, struct members and overrides.

use lumen_diagnostic::ErrorCode;
use lumen_ir::{Span, StorageClass};
use lumen_sem::{DeclKind, Idx, SemVariable, TypeFlags, TypeKind};

use super::{Valid, Validator};

/// Facts about a `var` declaration the semantic variable does not record.
#[derive(Copy, Clone, Debug)]
pub(crate) struct VarSyntax {
    pub is_global: bool,
    pub has_initializer: bool,
    pub access_spelled: bool,
    pub ignore_storage_class: bool,
}

impl Validator<'_> {
    // ========================================================================
    // Variables
    // ========================================================================

    /// The initializer's (loaded) type must be the declared type.
    pub(crate) fn initializer(
        &mut self,
        keyword: &str,
        declared: Idx,
        init: Idx,
        span: Span,
    ) -> Valid {
        if declared == init {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2001,
            format!(
                "cannot initialize {keyword} of type '{}' with value of type '{}'",
                self.type_name(declared),
                self.type_name(init)
            ),
            span,
        ))
    }

    /// `let` and `const` hold values: constructible types, or pointers for
    /// `let`.
    pub(crate) fn value_decl(&mut self, var: &SemVariable) -> Valid {
        let pool = self.pool();
        let ok = match var.decl_kind {
            DeclKind::Let => {
                pool.is_constructible(var.ty) || matches!(pool.kind(var.ty), TypeKind::Pointer { .. })
            }
            DeclKind::Const => pool.is_constructible(var.ty),
            DeclKind::Override => pool.is_scalar(var.ty) && !pool.is_abstract(var.ty),
            DeclKind::Var | DeclKind::Param => true,
        };
        if ok {
            return Ok(());
        }
        let message = if var.decl_kind == DeclKind::Override {
            "'override' type must be scalar".to_owned()
        } else {
            let keyword = if var.decl_kind == DeclKind::Let {
                "let"
            } else {
                "const"
            };
            format!(
                "'{}' cannot be used as the type of a '{keyword}'",
                self.type_name(var.ty)
            )
        };
        Err(self.error(ErrorCode::E2004, message, var.span))
    }

    pub(crate) fn var(&mut self, var: &SemVariable, syntax: VarSyntax) -> Valid {
        let sc = var.storage_class;
        let span = var.span;
        let ty = var.ty;
        let flags = self.pool().flags(ty);

        if syntax.is_global && sc == StorageClass::Function {
            return Err(self.error(
                ErrorCode::E2012,
                "module-scope 'var' must not use the 'function' storage class",
                span,
            ));
        }
        if !syntax.is_global && sc != StorageClass::Function && !syntax.ignore_storage_class {
            return Err(self.error(
                ErrorCode::E2012,
                "function-scope 'var' declaration must use 'function' storage class",
                span,
            ));
        }
        if syntax.has_initializer && !matches!(sc, StorageClass::Private | StorageClass::Function)
        {
            return Err(self.error(
                ErrorCode::E2012,
                format!(
                    "var of storage class '{sc}' cannot have an initializer. var initializers \
                     are only supported for the storage classes 'private' and 'function'"
                ),
                span,
            ));
        }
        if syntax.access_spelled && sc != StorageClass::Storage {
            return Err(self.error(
                ErrorCode::E2012,
                "only variables in <storage> storage class may declare an access mode",
                span,
            ));
        }
        if flags.contains(TypeFlags::IS_HANDLE) != (sc == StorageClass::Handle) {
            return Err(self.error(
                ErrorCode::E2012,
                format!(
                    "variables of type '{}' cannot be declared in the '{sc}' storage class",
                    self.type_name(ty)
                ),
                span,
            ));
        }
        if !flags.contains(TypeFlags::IS_HANDLE) && !flags.contains(TypeFlags::IS_STORABLE) {
            return Err(self.error(
                ErrorCode::E2004,
                format!("'{}' cannot be used as the type of a var", self.type_name(ty)),
                span,
            ));
        }
        if matches!(sc, StorageClass::Function | StorageClass::Private)
            && !flags.contains(TypeFlags::IS_CONSTRUCTIBLE)
        {
            return Err(self.error(
                ErrorCode::E2004,
                format!(
                    "var of storage class '{sc}' must have a constructible type, found '{}'",
                    self.type_name(ty)
                ),
                span,
            ));
        }
        if flags.contains(TypeFlags::HAS_ATOMIC) {
            if !matches!(sc, StorageClass::Storage | StorageClass::Workgroup) {
                return Err(self.error(
                    ErrorCode::E2012,
                    "atomic variables must have <storage> or <workgroup> storage class",
                    span,
                ));
            }
            if sc == StorageClass::Storage && !var.access.can_write() {
                return Err(self.error(
                    ErrorCode::E2012,
                    "atomic variables in <storage> storage class must have read_write access mode",
                    span,
                ));
            }
        }

        let is_resource = matches!(
            sc,
            StorageClass::Uniform | StorageClass::Storage | StorageClass::Handle
        );
        if syntax.is_global && is_resource && var.binding_point.is_none() {
            return Err(self.error(
                ErrorCode::E2005,
                "resource variables require @group and @binding attributes",
                span,
            ));
        }
        if !is_resource && var.binding_point.is_some() {
            return Err(self.error(
                ErrorCode::E2005,
                "non-resource variables must not have @group or @binding attributes",
                span,
            ));
        }
        Ok(())
    }

    pub(crate) fn global_initializer_stage(&mut self, keyword: &str, span: Span) -> Valid {
        Err(self.error(
            ErrorCode::E2006,
            format!("module-scope '{keyword}' initializer must be a constant or override-expression"),
            span,
        ))
    }

    pub(crate) fn override_id(&mut self, id: u32, span: Span) -> Valid {
        if id <= u32::from(u16::MAX) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2016,
            "'id' must be between 0 and 65535",
            span,
        ))
    }

    pub(crate) fn duplicate_override_id(&mut self, id: u16, span: Span, previous: Span) -> Valid {
        let guarantee = self.error(ErrorCode::E2016, "@id values must be unique", span);
        self.note(
            format!("a override with an ID of {id} was previously declared here:"),
            previous,
        );
        Err(guarantee)
    }

    // ========================================================================
    // Functions
    // ========================================================================

    pub(crate) fn param_type(&mut self, ty: Idx, span: Span) -> Valid {
        let pool = self.pool();
        if pool.is_constructible(ty)
            || pool.is_handle(ty)
            || matches!(pool.kind(ty), TypeKind::Pointer { .. })
        {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2004,
            format!(
                "type of function parameter must be constructible, found '{}'",
                self.type_name(ty)
            ),
            span,
        ))
    }

    pub(crate) fn return_type(&mut self, ty: Idx, span: Span) -> Valid {
        if ty == Idx::VOID || self.pool().is_constructible(ty) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2004,
            format!(
                "function return type must be a constructible type, found '{}'",
                self.type_name(ty)
            ),
            span,
        ))
    }

    pub(crate) fn duplicate_name(&mut self, what: &str, name: &str, span: Span, previous: Span) -> Valid {
        let guarantee = self.error(
            ErrorCode::E2013,
            format!("redefinition of {what} '{name}'"),
            span,
        );
        self.note("previous definition is here", previous);
        Err(guarantee)
    }

    // ========================================================================
    // Structs
    // ========================================================================

    pub(crate) fn struct_member_type(&mut self, ty: Idx, is_last: bool, span: Span) -> Valid {
        let pool = self.pool();
        if pool.is_runtime_array(ty) {
            if is_last {
                return Ok(());
            }
            return Err(self.error(
                ErrorCode::E2011,
                "runtime arrays may only appear as the last member of a struct",
                span,
            ));
        }
        if pool.flags(ty).contains(TypeFlags::HAS_RUNTIME_ARRAY) {
            return Err(self.error(
                ErrorCode::E2011,
                "a struct that contains a runtime array cannot be nested inside another struct",
                span,
            ));
        }
        if pool.is_storable(ty) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2004,
            format!(
                "'{}' cannot be used as the type of a structure member",
                self.type_name(ty)
            ),
            span,
        ))
    }

    pub(crate) fn member_align(&mut self, align: u32, span: Span) -> Valid {
        if align.is_power_of_two() {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2011,
            "'align' value must be a positive, power-of-two integer",
            span,
        ))
    }

    pub(crate) fn member_size(&mut self, size: u32, natural: u32, span: Span) -> Valid {
        if size >= natural {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2011,
            format!("size must be at least as big as the type's size ({natural})"),
            span,
        ))
    }

    pub(crate) fn member_offset(&mut self, offset: u32, running: u64, span: Span) -> Valid {
        if u64::from(offset) >= running {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2011,
            "offsets must be in ascending order",
            span,
        ))
    }

    /// Limit on struct and array byte sizes and member offsets.
    pub(crate) fn byte_limit(&mut self, what: &str, value: u64, span: Span) -> Valid {
        if value <= u64::from(u32::MAX) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2010,
            format!("{what} (0x{value:x}) must not exceed 0xffffffff bytes"),
            span,
        ))
    }
}
