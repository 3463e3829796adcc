//! Programmatic construction of syntax graphs.
//!
//! `AstBuilder` stands in for a parser. All methods take `&self` so calls can
//! nest (`b.binary(BinaryOp::Add, b.lit_int(1), b.ident("x"))`). Each node
//! gets a fresh `NodeId` and a distinct one-byte span derived from it.
//!
//! A node may only be referenced once: the resolver visits every node exactly
//! once and treats sharing as an internal error.

use std::cell::RefCell;

use crate::ast::NodeKind;
use crate::{
    Access, Alias, AliasId, AttrId, Attribute, AttributeKind, BinaryOp, BuiltinValue, CallTarget,
    CaseClause, CaseId, Enable, EnableId, Expr, ExprId, ExprKind, Extension, FloatSuffix,
    Function, FunctionId, GlobalDecl, Ident, IdentId, IntSuffix, Literal, MemberId, Module, Name,
    NodeId, NodeInfo, Param, ParamId, PipelineStage, SamplerKind, Span, Stmt, StmtId, StmtKind,
    StorageClass, StringInterner, StructDecl, StructDeclId, StructMember, TexelFormat,
    TextureDimension, TypeExpr, TypeExprId, TypeExprKind, UnaryOp, Variable, VariableId,
    VariableKind,
};

/// Convert an arena length to a `u32` index.
#[expect(
    clippy::cast_possible_truncation,
    reason = "arenas are bounded by the u32 node id space"
)]
fn next_index(len: usize) -> u32 {
    len as u32
}

/// Builder for a [`Module`].
pub struct AstBuilder<'a> {
    interner: &'a StringInterner,
    module: RefCell<Module>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        let mut module = Module::default();
        module.nodes.push(NodeInfo {
            kind: NodeKind::Module,
            span: Span::new(0, 1),
        });
        module.root = NodeId::new(0);
        AstBuilder {
            interner,
            module: RefCell::new(module),
        }
    }

    /// Finish building and return the module.
    pub fn finish(self) -> Module {
        self.module.into_inner()
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn alloc_node(&self, kind: NodeKind) -> (NodeId, Span) {
        let mut module = self.module.borrow_mut();
        let index = next_index(module.nodes.len());
        let span = Span::new(index, index + 1);
        module.nodes.push(NodeInfo { kind, span });
        (NodeId::new(index), span)
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn ty(&self, kind: TypeExprKind) -> TypeExprId {
        let (id, span) = self.alloc_node(NodeKind::Type);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.types.len());
        module.types.push(TypeExpr { id, kind, span });
        TypeExprId::new(index)
    }

    pub fn ty_void(&self) -> TypeExprId {
        self.ty(TypeExprKind::Void)
    }

    pub fn ty_bool(&self) -> TypeExprId {
        self.ty(TypeExprKind::Bool)
    }

    pub fn ty_i32(&self) -> TypeExprId {
        self.ty(TypeExprKind::I32)
    }

    pub fn ty_u32(&self) -> TypeExprId {
        self.ty(TypeExprKind::U32)
    }

    pub fn ty_f32(&self) -> TypeExprId {
        self.ty(TypeExprKind::F32)
    }

    pub fn ty_f16(&self) -> TypeExprId {
        self.ty(TypeExprKind::F16)
    }

    pub fn ty_vec(&self, width: u32, elem: TypeExprId) -> TypeExprId {
        self.ty(TypeExprKind::Vector {
            width,
            elem: Some(elem),
        })
    }

    /// `vecN` with the element type left for inference.
    pub fn ty_vec_infer(&self, width: u32) -> TypeExprId {
        self.ty(TypeExprKind::Vector { width, elem: None })
    }

    pub fn ty_mat(&self, columns: u32, rows: u32, elem: TypeExprId) -> TypeExprId {
        self.ty(TypeExprKind::Matrix {
            columns,
            rows,
            elem: Some(elem),
        })
    }

    pub fn ty_mat_infer(&self, columns: u32, rows: u32) -> TypeExprId {
        self.ty(TypeExprKind::Matrix {
            columns,
            rows,
            elem: None,
        })
    }

    pub fn ty_array(&self, elem: TypeExprId, count: ExprId) -> TypeExprId {
        self.ty(TypeExprKind::Array {
            elem: Some(elem),
            count: Some(count),
            attrs: Vec::new(),
        })
    }

    pub fn ty_array_with(
        &self,
        elem: Option<TypeExprId>,
        count: Option<ExprId>,
        attrs: Vec<AttrId>,
    ) -> TypeExprId {
        self.ty(TypeExprKind::Array { elem, count, attrs })
    }

    pub fn ty_runtime_array(&self, elem: TypeExprId) -> TypeExprId {
        self.ty(TypeExprKind::Array {
            elem: Some(elem),
            count: None,
            attrs: Vec::new(),
        })
    }

    /// `array` with element type and count left for inference.
    pub fn ty_array_infer(&self) -> TypeExprId {
        self.ty(TypeExprKind::Array {
            elem: None,
            count: None,
            attrs: Vec::new(),
        })
    }

    pub fn ty_atomic(&self, elem: TypeExprId) -> TypeExprId {
        self.ty(TypeExprKind::Atomic { elem })
    }

    pub fn ty_ptr(
        &self,
        storage_class: StorageClass,
        store: TypeExprId,
        access: Option<Access>,
    ) -> TypeExprId {
        self.ty(TypeExprKind::Pointer {
            store,
            storage_class,
            access,
        })
    }

    pub fn ty_sampler(&self, kind: SamplerKind) -> TypeExprId {
        self.ty(TypeExprKind::Sampler(kind))
    }

    pub fn ty_sampled_texture(&self, dim: TextureDimension, elem: TypeExprId) -> TypeExprId {
        self.ty(TypeExprKind::SampledTexture { dim, elem })
    }

    pub fn ty_depth_texture(&self, dim: TextureDimension) -> TypeExprId {
        self.ty(TypeExprKind::DepthTexture { dim })
    }

    pub fn ty_storage_texture(
        &self,
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    ) -> TypeExprId {
        self.ty(TypeExprKind::StorageTexture {
            dim,
            format,
            access,
        })
    }

    pub fn ty_named(&self, name: &str) -> TypeExprId {
        self.ty(TypeExprKind::Named(self.name(name)))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn expr(&self, kind: ExprKind) -> ExprId {
        let (id, span) = self.alloc_node(NodeKind::Expression);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.exprs.len());
        module.exprs.push(Expr { id, kind, span });
        ExprId::new(index)
    }

    /// Unsuffixed integer literal (abstract integer).
    pub fn lit_int(&self, value: i64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int {
            value,
            suffix: IntSuffix::None,
        }))
    }

    pub fn lit_i32(&self, value: i32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int {
            value: i64::from(value),
            suffix: IntSuffix::I,
        }))
    }

    pub fn lit_u32(&self, value: u32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int {
            value: i64::from(value),
            suffix: IntSuffix::U,
        }))
    }

    /// Unsuffixed float literal (abstract float).
    pub fn lit_float(&self, value: f64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::float(value, FloatSuffix::None)))
    }

    pub fn lit_f32(&self, value: f32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::float(
            f64::from(value),
            FloatSuffix::F,
        )))
    }

    pub fn lit_f16(&self, value: f32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::float(
            f64::from(value),
            FloatSuffix::H,
        )))
    }

    pub fn lit_bool(&self, value: bool) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn ident(&self, name: &str) -> ExprId {
        self.expr(ExprKind::Ident(self.name(name)))
    }

    pub fn binary(&self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, lhs, rhs })
    }

    pub fn index(&self, object: ExprId, index: ExprId) -> ExprId {
        self.expr(ExprKind::Index { object, index })
    }

    pub fn member(&self, object: ExprId, member: &str) -> ExprId {
        self.expr(ExprKind::Member {
            object,
            member: self.name(member),
        })
    }

    pub fn unary(&self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn addr_of(&self, operand: ExprId) -> ExprId {
        self.unary(UnaryOp::AddressOf, operand)
    }

    pub fn deref(&self, operand: ExprId) -> ExprId {
        self.unary(UnaryOp::Indirection, operand)
    }

    pub fn bitcast(&self, ty: TypeExprId, expr: ExprId) -> ExprId {
        self.expr(ExprKind::Bitcast { ty, expr })
    }

    /// Call through an identifier: function, builtin, struct or alias.
    pub fn call(&self, name: &str, args: Vec<ExprId>) -> ExprId {
        let (id, span) = self.alloc_node(NodeKind::Identifier);
        let ident = {
            let mut module = self.module.borrow_mut();
            let index = next_index(module.idents.len());
            module.idents.push(Ident {
                id,
                name: self.name(name),
                span,
            });
            IdentId::new(index)
        };
        self.expr(ExprKind::Call {
            target: CallTarget::Ident(ident),
            args,
        })
    }

    /// Constructor or conversion through a spelled-out type.
    pub fn construct(&self, ty: TypeExprId, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call {
            target: CallTarget::Type(ty),
            args,
        })
    }

    pub fn phony(&self) -> ExprId {
        self.expr(ExprKind::Phony)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn stmt(&self, kind: StmtKind) -> StmtId {
        let (id, span) = self.alloc_node(NodeKind::Statement);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.stmts.len());
        module.stmts.push(Stmt { id, kind, span });
        StmtId::new(index)
    }

    pub fn block(&self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn assign(&self, lhs: ExprId, rhs: ExprId) -> StmtId {
        self.stmt(StmtKind::Assign { lhs, rhs })
    }

    pub fn compound_assign(&self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> StmtId {
        self.stmt(StmtKind::CompoundAssign { op, lhs, rhs })
    }

    pub fn increment(&self, lhs: ExprId) -> StmtId {
        self.stmt(StmtKind::IncDec {
            lhs,
            increment: true,
        })
    }

    pub fn decrement(&self, lhs: ExprId) -> StmtId {
        self.stmt(StmtKind::IncDec {
            lhs,
            increment: false,
        })
    }

    pub fn break_(&self) -> StmtId {
        self.stmt(StmtKind::Break)
    }

    pub fn continue_(&self) -> StmtId {
        self.stmt(StmtKind::Continue)
    }

    pub fn discard(&self) -> StmtId {
        self.stmt(StmtKind::Discard)
    }

    pub fn fallthrough(&self) -> StmtId {
        self.stmt(StmtKind::Fallthrough)
    }

    pub fn call_stmt(&self, call: ExprId) -> StmtId {
        self.stmt(StmtKind::Call(call))
    }

    pub fn return_(&self) -> StmtId {
        self.stmt(StmtKind::Return(None))
    }

    pub fn return_value(&self, value: ExprId) -> StmtId {
        self.stmt(StmtKind::Return(Some(value)))
    }

    pub fn decl(&self, var: VariableId) -> StmtId {
        self.stmt(StmtKind::VarDecl(var))
    }

    pub fn static_assert(&self, cond: ExprId) -> StmtId {
        self.stmt(StmtKind::StaticAssert(cond))
    }

    /// `if cond { body } else <else_stmt>`; `else_stmt` is a block or another `if`.
    pub fn if_(&self, cond: ExprId, body: Vec<StmtId>, else_stmt: Option<StmtId>) -> StmtId {
        let body = self.block(body);
        self.stmt(StmtKind::If {
            cond,
            body,
            else_stmt,
        })
    }

    pub fn loop_(&self, body: Vec<StmtId>, continuing: Option<Vec<StmtId>>) -> StmtId {
        let body = self.block(body);
        let continuing = continuing.map(|stmts| self.block(stmts));
        self.stmt(StmtKind::Loop { body, continuing })
    }

    pub fn for_(
        &self,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        continuing: Option<StmtId>,
        body: Vec<StmtId>,
    ) -> StmtId {
        let body = self.block(body);
        self.stmt(StmtKind::For {
            init,
            cond,
            continuing,
            body,
        })
    }

    pub fn while_(&self, cond: ExprId, body: Vec<StmtId>) -> StmtId {
        let body = self.block(body);
        self.stmt(StmtKind::While { cond, body })
    }

    pub fn switch(&self, cond: ExprId, cases: Vec<CaseId>) -> StmtId {
        self.stmt(StmtKind::Switch { cond, cases })
    }

    pub fn case(&self, selectors: Vec<ExprId>, body: Vec<StmtId>) -> CaseId {
        let body = self.block(body);
        let (id, span) = self.alloc_node(NodeKind::Case);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.cases.len());
        module.cases.push(CaseClause {
            id,
            selectors,
            body,
            span,
        });
        CaseId::new(index)
    }

    pub fn default_case(&self, body: Vec<StmtId>) -> CaseId {
        self.case(Vec::new(), body)
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub fn variable(
        &self,
        name: &str,
        kind: VariableKind,
        ty: Option<TypeExprId>,
        init: Option<ExprId>,
        attrs: Vec<AttrId>,
    ) -> VariableId {
        let (id, span) = self.alloc_node(NodeKind::Variable);
        let name = self.name(name);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.variables.len());
        module.variables.push(Variable {
            id,
            name,
            kind,
            ty,
            init,
            attrs,
            span,
        });
        VariableId::new(index)
    }

    /// `var name: ty = init;` with inferred storage class and access.
    pub fn var(&self, name: &str, ty: Option<TypeExprId>, init: Option<ExprId>) -> VariableId {
        self.variable(
            name,
            VariableKind::Var {
                storage_class: None,
                access: None,
            },
            ty,
            init,
            Vec::new(),
        )
    }

    /// `var<sc> name: ty = init;`
    pub fn var_in(
        &self,
        name: &str,
        storage_class: StorageClass,
        ty: Option<TypeExprId>,
        init: Option<ExprId>,
    ) -> VariableId {
        self.variable(
            name,
            VariableKind::Var {
                storage_class: Some(storage_class),
                access: None,
            },
            ty,
            init,
            Vec::new(),
        )
    }

    pub fn let_(&self, name: &str, ty: Option<TypeExprId>, init: Option<ExprId>) -> VariableId {
        self.variable(name, VariableKind::Let, ty, init, Vec::new())
    }

    pub fn const_(&self, name: &str, ty: Option<TypeExprId>, init: Option<ExprId>) -> VariableId {
        self.variable(name, VariableKind::Const, ty, init, Vec::new())
    }

    pub fn override_(
        &self,
        name: &str,
        ty: Option<TypeExprId>,
        init: Option<ExprId>,
        attrs: Vec<AttrId>,
    ) -> VariableId {
        self.variable(name, VariableKind::Override, ty, init, attrs)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attr(&self, kind: AttributeKind) -> AttrId {
        let (id, span) = self.alloc_node(NodeKind::Attribute);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.attrs.len());
        module.attrs.push(Attribute { id, kind, span });
        AttrId::new(index)
    }

    pub fn stage(&self, stage: PipelineStage) -> AttrId {
        self.attr(AttributeKind::Stage(stage))
    }

    pub fn workgroup_size(&self, x: ExprId, y: Option<ExprId>, z: Option<ExprId>) -> AttrId {
        self.attr(AttributeKind::WorkgroupSize { x, y, z })
    }

    pub fn binding(&self, value: u32) -> AttrId {
        self.attr(AttributeKind::Binding(value))
    }

    pub fn group(&self, value: u32) -> AttrId {
        self.attr(AttributeKind::Group(value))
    }

    pub fn builtin(&self, value: BuiltinValue) -> AttrId {
        self.attr(AttributeKind::Builtin(value))
    }

    pub fn location(&self, value: u32) -> AttrId {
        self.attr(AttributeKind::Location(value))
    }

    // ========================================================================
    // Module-Scope Declarations
    // ========================================================================

    fn push_global(&self, decl: GlobalDecl) {
        self.module.borrow_mut().globals.push(decl);
    }

    /// Register a variable as a module-scope declaration.
    pub fn global(&self, var: VariableId) -> VariableId {
        self.push_global(GlobalDecl::Variable(var));
        var
    }

    pub fn enable(&self, extension: Extension) -> EnableId {
        let (id, span) = self.alloc_node(NodeKind::Enable);
        let index = {
            let mut module = self.module.borrow_mut();
            let index = next_index(module.enables.len());
            module.enables.push(Enable {
                id,
                extension,
                span,
            });
            EnableId::new(index)
        };
        self.push_global(GlobalDecl::Enable(index));
        index
    }

    pub fn alias(&self, name: &str, ty: TypeExprId) -> AliasId {
        let (id, span) = self.alloc_node(NodeKind::Alias);
        let name = self.name(name);
        let index = {
            let mut module = self.module.borrow_mut();
            let index = next_index(module.aliases.len());
            module.aliases.push(Alias { id, name, ty, span });
            AliasId::new(index)
        };
        self.push_global(GlobalDecl::Alias(index));
        index
    }

    pub fn struct_member(&self, name: &str, ty: TypeExprId, attrs: Vec<AttrId>) -> MemberId {
        let (id, span) = self.alloc_node(NodeKind::StructMember);
        let name = self.name(name);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.members.len());
        module.members.push(StructMember {
            id,
            name,
            ty,
            attrs,
            span,
        });
        MemberId::new(index)
    }

    pub fn structure(&self, name: &str, members: Vec<MemberId>) -> StructDeclId {
        let (id, span) = self.alloc_node(NodeKind::Struct);
        let name = self.name(name);
        let index = {
            let mut module = self.module.borrow_mut();
            let index = next_index(module.structs.len());
            module.structs.push(StructDecl {
                id,
                name,
                members,
                attrs: Vec::new(),
                span,
            });
            StructDeclId::new(index)
        };
        self.push_global(GlobalDecl::Struct(index));
        index
    }

    pub fn param(&self, name: &str, ty: TypeExprId, attrs: Vec<AttrId>) -> ParamId {
        let (id, span) = self.alloc_node(NodeKind::Parameter);
        let name = self.name(name);
        let mut module = self.module.borrow_mut();
        let index = next_index(module.params.len());
        module.params.push(Param {
            id,
            name,
            ty,
            attrs,
            span,
        });
        ParamId::new(index)
    }

    pub fn func(
        &self,
        name: &str,
        params: Vec<ParamId>,
        return_type: Option<TypeExprId>,
        body: Vec<StmtId>,
        attrs: Vec<AttrId>,
    ) -> FunctionId {
        self.func_with_return_attrs(name, params, return_type, Vec::new(), body, attrs)
    }

    pub fn func_with_return_attrs(
        &self,
        name: &str,
        params: Vec<ParamId>,
        return_type: Option<TypeExprId>,
        return_attrs: Vec<AttrId>,
        body: Vec<StmtId>,
        attrs: Vec<AttrId>,
    ) -> FunctionId {
        let body = self.block(body);
        let (id, span) = self.alloc_node(NodeKind::Function);
        let name = self.name(name);
        let index = {
            let mut module = self.module.borrow_mut();
            let stage = attrs
                .iter()
                .find_map(|attr| match module.attrs[attr.index()].kind {
                    AttributeKind::Stage(stage) => Some(stage),
                    _ => None,
                });
            let index = next_index(module.functions.len());
            module.functions.push(Function {
                id,
                name,
                params,
                return_type,
                return_attrs,
                body,
                attrs,
                stage,
                span,
            });
            FunctionId::new(index)
        };
        self.push_global(GlobalDecl::Function(index));
        index
    }

    pub fn global_static_assert(&self, cond: ExprId) -> StmtId {
        let stmt = self.static_assert(cond);
        self.push_global(GlobalDecl::StaticAssert(stmt));
        stmt
    }
}

#[cfg(test)]
mod tests;
