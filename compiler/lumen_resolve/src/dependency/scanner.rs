//! Scope-aware walk over one module-scope declaration.

use lumen_diagnostic::{DiagnosticSink, ErrorCode, ErrorGuaranteed};
use lumen_ir::{
    AttrId, AttributeKind, CallTarget, ExprId, ExprKind, FunctionId, GlobalDecl, Module, Name,
    NodeId, Span, StmtId, StmtKind, StringInterner, TypeExprId, TypeExprKind, VariableId,
};
use lumen_sem::BuiltinFn;
use lumen_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use super::{Decl, Edge, Global};

/// What an identifier is used as, for "unknown ..." messages.
#[derive(Copy, Clone, Eq, PartialEq)]
enum Usage {
    Identifier,
    Function,
    Type,
}

impl Usage {
    const fn as_str(self) -> &'static str {
        match self {
            Usage::Identifier => "identifier",
            Usage::Function => "function",
            Usage::Type => "type",
        }
    }
}

type Scope = FxHashMap<Name, (Decl, Span)>;

pub(super) struct Scanner<'a> {
    module: &'a Module,
    interner: &'a StringInterner,
    sink: &'a mut DiagnosticSink,
    globals: &'a [Global],
    by_name: &'a FxHashMap<Name, usize>,
    resolved: &'a mut FxHashMap<NodeId, Decl>,
    shadows: &'a mut Vec<(Decl, Decl)>,
    /// Function-local scopes, innermost last. Module scope is `by_name`.
    scopes: Vec<Scope>,
    edges: Vec<Edge>,
    error: Option<ErrorGuaranteed>,
}

impl<'a> Scanner<'a> {
    #[expect(
        clippy::too_many_arguments,
        reason = "borrows are split across the graph under construction"
    )]
    pub(super) fn new(
        module: &'a Module,
        interner: &'a StringInterner,
        sink: &'a mut DiagnosticSink,
        globals: &'a [Global],
        by_name: &'a FxHashMap<Name, usize>,
        resolved: &'a mut FxHashMap<NodeId, Decl>,
        shadows: &'a mut Vec<(Decl, Decl)>,
    ) -> Self {
        Scanner {
            module,
            interner,
            sink,
            globals,
            by_name,
            resolved,
            shadows,
            scopes: Vec::new(),
            edges: Vec::new(),
            error: None,
        }
    }

    /// Dependencies of the scanned global, and whether an error was reported.
    pub(super) fn finish(self) -> (Vec<Edge>, Option<ErrorGuaranteed>) {
        (self.edges, self.error)
    }

    pub(super) fn global(&mut self, decl: GlobalDecl) {
        let module = self.module;
        match decl {
            GlobalDecl::Enable(_) => {}
            GlobalDecl::Alias(id) => self.type_expr(module.alias(id).ty),
            GlobalDecl::Struct(id) => {
                let decl = module.struct_decl(id);
                self.attributes(&decl.attrs);
                for &member in &decl.members {
                    let member = module.member(member);
                    self.type_expr(member.ty);
                    self.attributes(&member.attrs);
                }
            }
            GlobalDecl::Function(id) => self.function(id),
            GlobalDecl::Variable(id) => self.variable(id),
            GlobalDecl::StaticAssert(id) => self.stmt(id),
        }
    }

    fn function(&mut self, id: FunctionId) {
        let module = self.module;
        let func = module.function(id);
        // Attribute expressions see module scope only.
        self.attributes(&func.attrs);

        // Parameters and the top level of the body share one scope.
        self.scopes.push(Scope::default());
        for &param_id in &func.params {
            let param = module.param(param_id);
            self.type_expr(param.ty);
            self.attributes(&param.attrs);
            self.declare(param.name, Decl::Param(param_id), param.span);
        }
        if let Some(ret) = func.return_type {
            self.type_expr(ret);
        }
        self.attributes(&func.return_attrs);
        self.block_contents(func.body);
        self.scopes.pop();
    }

    fn variable(&mut self, id: VariableId) {
        let var = self.module.variable(id);
        if let Some(ty) = var.ty {
            self.type_expr(ty);
        }
        if let Some(init) = var.init {
            self.expr(init);
        }
        self.attributes(&var.attrs);
    }

    fn attributes(&mut self, attrs: &[AttrId]) {
        let module = self.module;
        for &attr in attrs {
            if let AttributeKind::WorkgroupSize { x, y, z } = module.attr(attr).kind {
                for arg in [Some(x), y, z].into_iter().flatten() {
                    self.expr(arg);
                }
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn stmt(&mut self, id: StmtId) {
        ensure_sufficient_stack(|| self.stmt_inner(id));
    }

    fn stmt_inner(&mut self, id: StmtId) {
        let module = self.module;
        match &module.stmt(id).kind {
            StmtKind::Block(_) => {
                self.scopes.push(Scope::default());
                self.block_contents(id);
                self.scopes.pop();
            }
            StmtKind::Assign { lhs, rhs } | StmtKind::CompoundAssign { lhs, rhs, .. } => {
                self.expr(*lhs);
                self.expr(*rhs);
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Discard | StmtKind::Fallthrough => {}
            StmtKind::Call(expr) | StmtKind::StaticAssert(expr) => self.expr(*expr),
            StmtKind::IncDec { lhs, .. } => self.expr(*lhs),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(*value);
                }
            }
            StmtKind::VarDecl(var) => {
                // The initializer cannot see the variable it initializes.
                self.variable(*var);
                let decl = module.variable(*var);
                self.declare(decl.name, Decl::Variable(*var), decl.span);
            }
            StmtKind::If {
                cond,
                body,
                else_stmt,
            } => {
                self.expr(*cond);
                self.stmt(*body);
                if let Some(else_stmt) = else_stmt {
                    self.stmt(*else_stmt);
                }
            }
            StmtKind::Loop { body, continuing } => {
                // The continuing block sees the body's declarations.
                self.scopes.push(Scope::default());
                self.block_contents(*body);
                if let Some(continuing) = continuing {
                    self.stmt(*continuing);
                }
                self.scopes.pop();
            }
            StmtKind::For {
                init,
                cond,
                continuing,
                body,
            } => {
                self.scopes.push(Scope::default());
                if let Some(init) = init {
                    self.stmt(*init);
                }
                if let Some(cond) = cond {
                    self.expr(*cond);
                }
                if let Some(continuing) = continuing {
                    self.stmt(*continuing);
                }
                self.stmt(*body);
                self.scopes.pop();
            }
            StmtKind::While { cond, body } => {
                self.expr(*cond);
                self.stmt(*body);
            }
            StmtKind::Switch { cond, cases } => {
                self.expr(*cond);
                for &case in cases {
                    let case = module.case(case);
                    for &selector in &case.selectors {
                        self.expr(selector);
                    }
                    self.stmt(case.body);
                }
            }
        }
    }

    /// Statements of a block, in the current scope.
    fn block_contents(&mut self, block: StmtId) {
        let module = self.module;
        if let StmtKind::Block(stmts) = &module.stmt(block).kind {
            for &stmt in stmts {
                self.stmt(stmt);
            }
        }
    }

    // ========================================================================
    // Expressions and Types
    // ========================================================================

    fn expr(&mut self, id: ExprId) {
        ensure_sufficient_stack(|| self.expr_inner(id));
    }

    fn expr_inner(&mut self, id: ExprId) {
        let module = self.module;
        let expr = module.expr(id);
        match &expr.kind {
            ExprKind::Ident(name) => self.resolve(*name, expr.id, expr.span, Usage::Identifier),
            ExprKind::Call { target, args } => {
                match *target {
                    CallTarget::Ident(ident) => {
                        let ident = module.ident(ident);
                        self.resolve(ident.name, ident.id, ident.span, Usage::Function);
                    }
                    CallTarget::Type(ty) => self.type_expr(ty),
                }
                for &arg in args {
                    self.expr(arg);
                }
            }
            ExprKind::Bitcast { ty, expr } => {
                self.type_expr(*ty);
                self.expr(*expr);
            }
            kind => {
                for child in kind.children() {
                    self.expr(child);
                }
            }
        }
    }

    fn type_expr(&mut self, id: TypeExprId) {
        ensure_sufficient_stack(|| self.type_expr_inner(id));
    }

    fn type_expr_inner(&mut self, id: TypeExprId) {
        let module = self.module;
        let ty = module.type_expr(id);
        match &ty.kind {
            TypeExprKind::Named(name) => self.resolve(*name, ty.id, ty.span, Usage::Type),
            TypeExprKind::Vector { elem, .. } | TypeExprKind::Matrix { elem, .. } => {
                if let Some(elem) = elem {
                    self.type_expr(*elem);
                }
            }
            TypeExprKind::Array { elem, count, attrs } => {
                if let Some(elem) = elem {
                    self.type_expr(*elem);
                }
                if let Some(count) = count {
                    self.expr(*count);
                }
                self.attributes(attrs);
            }
            TypeExprKind::Atomic { elem }
            | TypeExprKind::SampledTexture { elem, .. }
            | TypeExprKind::MultisampledTexture { elem, .. } => self.type_expr(*elem),
            TypeExprKind::Pointer { store, .. } => self.type_expr(*store),
            TypeExprKind::Void
            | TypeExprKind::Bool
            | TypeExprKind::I32
            | TypeExprKind::U32
            | TypeExprKind::F32
            | TypeExprKind::F16
            | TypeExprKind::Sampler(_)
            | TypeExprKind::DepthTexture { .. }
            | TypeExprKind::DepthMultisampledTexture { .. }
            | TypeExprKind::StorageTexture { .. }
            | TypeExprKind::ExternalTexture => {}
        }
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    fn resolve(&mut self, name: Name, node: NodeId, span: Span, usage: Usage) {
        if let Some(decl) = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).map(|&(decl, _)| decl))
        {
            self.resolved.insert(node, decl);
            return;
        }

        if let Some(&index) = self.by_name.get(&name) {
            if let Some(decl) = Decl::from_global(self.globals[index].decl) {
                self.resolved.insert(node, decl);
                if !self.edges.iter().any(|edge| edge.to == index) {
                    self.edges.push(Edge {
                        to: index,
                        span,
                        call: usage == Usage::Function,
                    });
                }
                return;
            }
        }

        let text = self.interner.lookup(name);
        if BuiltinFn::from_name(text).is_some() {
            return;
        }
        self.error = Some(self.sink.add_error(
            ErrorCode::E1001,
            format!("unknown {}: '{text}'", usage.as_str()),
            span,
        ));
    }

    fn declare(&mut self, name: Name, decl: Decl, span: Span) {
        let Some((current, outer)) = self.scopes.split_last_mut() else {
            return;
        };

        if let Some(&(_, previous)) = current.get(&name) {
            // Duplicate parameters are reported by the resolver.
            if !matches!(decl, Decl::Param(_)) {
                let text = self.interner.lookup(name);
                self.error = Some(self.sink.add_error(
                    ErrorCode::E1002,
                    format!("redeclaration of '{text}'"),
                    span,
                ));
                self.sink
                    .add_note(format!("'{text}' previously declared here"), previous);
            }
            return;
        }

        let shadowed = outer
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).map(|&(decl, _)| decl))
            .or_else(|| {
                self.by_name
                    .get(&name)
                    .and_then(|&index| Decl::from_global(self.globals[index].decl))
            });
        if let Some(shadowed) = shadowed {
            self.shadows.push((decl, shadowed));
        }
        current.insert(name, (decl, span));
    }
}
