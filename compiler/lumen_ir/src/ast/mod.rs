//! Syntax graph of a single program.
//!
//! Nodes are stored flat in per-category arenas owned by [`Module`] and
//! reference each other by index. Every node also has a program-wide
//! [`NodeId`]; `Module::node` maps it back to the node's category and span.

mod decl;
mod expr;
mod operators;
mod stmt;
mod types;

use std::fmt;

pub use decl::{
    Alias, Attribute, AttributeKind, DisabledValidation, Enable, Function, Param, StructDecl,
    StructMember, Variable, VariableKind,
};
pub use expr::{CallTarget, Expr, ExprKind, FloatSuffix, Ident, IntSuffix, Literal};
pub use operators::{BinaryOp, UnaryOp};
pub use stmt::{CaseClause, Stmt, StmtKind};
pub use types::{TypeExpr, TypeExprKind};

use crate::{
    AliasId, AttrId, CaseId, EnableId, ExprId, FunctionId, IdentId, MemberId, NodeId, ParamId,
    Span, StmtId, StructDeclId, TypeExprId, VariableId,
};

/// Category of a syntax node, used in internal-error messages.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    Module,
    Enable,
    Alias,
    Struct,
    StructMember,
    Function,
    Parameter,
    Variable,
    Attribute,
    Type,
    Expression,
    Statement,
    Case,
    Identifier,
}

impl NodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Module => "Module",
            NodeKind::Enable => "Enable",
            NodeKind::Alias => "Alias",
            NodeKind::Struct => "Struct",
            NodeKind::StructMember => "StructMember",
            NodeKind::Function => "Function",
            NodeKind::Parameter => "Parameter",
            NodeKind::Variable => "Variable",
            NodeKind::Attribute => "Attribute",
            NodeKind::Type => "Type",
            NodeKind::Expression => "Expression",
            NodeKind::Statement => "Statement",
            NodeKind::Case => "CaseStatement",
            NodeKind::Identifier => "Identifier",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category and location of a node, indexed by [`NodeId`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct NodeInfo {
    pub kind: NodeKind,
    pub span: Span,
}

/// A module-scope declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GlobalDecl {
    Enable(EnableId),
    Alias(AliasId),
    Struct(StructDeclId),
    Function(FunctionId),
    Variable(VariableId),
    /// A `StmtKind::StaticAssert` at module scope.
    StaticAssert(StmtId),
}

/// A parsed program.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub(crate) nodes: Vec<NodeInfo>,
    pub(crate) root: NodeId,
    pub(crate) globals: Vec<GlobalDecl>,
    pub(crate) enables: Vec<Enable>,
    pub(crate) aliases: Vec<Alias>,
    pub(crate) structs: Vec<StructDecl>,
    pub(crate) members: Vec<StructMember>,
    pub(crate) functions: Vec<Function>,
    pub(crate) params: Vec<Param>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) attrs: Vec<Attribute>,
    pub(crate) types: Vec<TypeExpr>,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) cases: Vec<CaseClause>,
    pub(crate) idents: Vec<Ident>,
}

impl Module {
    /// Node id of the module itself.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of syntax nodes, including the module root.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> NodeInfo {
        self.nodes.get(id.index()).copied().unwrap_or(NodeInfo {
            kind: NodeKind::Module,
            span: Span::DUMMY,
        })
    }

    /// All nodes in allocation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, NodeInfo)> + '_ {
        self.nodes.iter().enumerate().map(|(i, info)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "node ids are allocated as u32"
            )]
            let id = NodeId::new(i as u32);
            (id, *info)
        })
    }

    /// Module-scope declarations in source order.
    #[inline]
    pub fn globals(&self) -> &[GlobalDecl] {
        &self.globals
    }

    // ========================================================================
    // Arena Accessors
    // ========================================================================

    #[inline]
    pub fn enable(&self, id: EnableId) -> &Enable {
        &self.enables[id.index()]
    }

    #[inline]
    pub fn alias(&self, id: AliasId) -> &Alias {
        &self.aliases[id.index()]
    }

    #[inline]
    pub fn struct_decl(&self, id: StructDeclId) -> &StructDecl {
        &self.structs[id.index()]
    }

    #[inline]
    pub fn member(&self, id: MemberId) -> &StructMember {
        &self.members[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn param(&self, id: ParamId) -> &Param {
        &self.params[id.index()]
    }

    #[inline]
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()]
    }

    #[inline]
    pub fn attr(&self, id: AttrId) -> &Attribute {
        &self.attrs[id.index()]
    }

    #[inline]
    pub fn type_expr(&self, id: TypeExprId) -> &TypeExpr {
        &self.types[id.index()]
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn case(&self, id: CaseId) -> &CaseClause {
        &self.cases[id.index()]
    }

    #[inline]
    pub fn ident(&self, id: IdentId) -> &Ident {
        &self.idents[id.index()]
    }

    /// Number of expressions in the arena.
    #[inline]
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    #[inline]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    #[inline]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn type_expr_count(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    #[inline]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Span of a module-scope declaration, for diagnostics.
    pub fn global_span(&self, decl: GlobalDecl) -> Span {
        match decl {
            GlobalDecl::Enable(id) => self.enable(id).span,
            GlobalDecl::Alias(id) => self.alias(id).span,
            GlobalDecl::Struct(id) => self.struct_decl(id).span,
            GlobalDecl::Function(id) => self.function(id).span,
            GlobalDecl::Variable(id) => self.variable(id).span,
            GlobalDecl::StaticAssert(id) => self.stmt(id).span,
        }
    }

    pub fn global_node(&self, decl: GlobalDecl) -> NodeId {
        match decl {
            GlobalDecl::Enable(id) => self.enable(id).id,
            GlobalDecl::Alias(id) => self.alias(id).id,
            GlobalDecl::Struct(id) => self.struct_decl(id).id,
            GlobalDecl::Function(id) => self.function(id).id,
            GlobalDecl::Variable(id) => self.variable(id).id,
            GlobalDecl::StaticAssert(id) => self.stmt(id).id,
        }
    }
}

#[cfg(test)]
mod tests;
