//! The output of a successful resolution.

use lumen_diagnostic::Diagnostic;
use lumen_ir::{ExprId, Extension, FunctionId, GlobalDecl, ParamId, StructDeclId, TypeExprId, VariableId};
use lumen_sem::{Idx, Pool, SemExpr, SemFunction, SemGraph, SemVariable, StructType};

/// A module with a semantic entity attached to every node.
#[derive(Clone, Debug)]
pub struct ResolvedProgram {
    graph: SemGraph,
    ordered_globals: Vec<GlobalDecl>,
    entry_points: Vec<lumen_sem::SemFnId>,
    extensions: Vec<Extension>,
    /// Warnings only; a program with errors does not resolve.
    warnings: Vec<Diagnostic>,
    visited_nodes: usize,
}

impl ResolvedProgram {
    pub(crate) fn new(
        graph: SemGraph,
        ordered_globals: Vec<GlobalDecl>,
        entry_points: Vec<lumen_sem::SemFnId>,
        extensions: Vec<Extension>,
        diagnostics: Vec<Diagnostic>,
        visited_nodes: usize,
    ) -> Self {
        ResolvedProgram {
            graph,
            ordered_globals,
            entry_points,
            extensions,
            warnings: diagnostics.into_iter().filter(|d| !d.is_error()).collect(),
            visited_nodes,
        }
    }

    pub fn graph(&self) -> &SemGraph {
        &self.graph
    }

    pub fn into_graph(self) -> SemGraph {
        self.graph
    }

    pub fn types(&self) -> &Pool {
        &self.graph.types
    }

    /// Global declarations in the order they were resolved.
    pub fn ordered_globals(&self) -> &[GlobalDecl] {
        &self.ordered_globals
    }

    /// Entry points in declaration-resolution order.
    pub fn entry_points(&self) -> impl Iterator<Item = &SemFunction> {
        self.entry_points.iter().map(|&id| self.graph.function(id))
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn is_enabled(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Number of syntax nodes the resolver visited. Equal to the module's
    /// node count.
    pub fn visited_nodes(&self) -> usize {
        self.visited_nodes
    }

    // ========================================================================
    // Lookups by Declaration
    // ========================================================================

    /// The semantic expression of `expr`, after materialization.
    pub fn expr(&self, expr: ExprId) -> Option<&SemExpr> {
        self.graph.expr_for(expr).map(|id| self.graph.expr(id))
    }

    pub fn type_of(&self, expr: ExprId) -> Option<Idx> {
        self.expr(expr).map(|e| e.ty)
    }

    pub fn resolved_type(&self, ty: TypeExprId) -> Option<Idx> {
        self.graph.type_for(ty)
    }

    pub fn variable(&self, decl: VariableId) -> Option<&SemVariable> {
        self.graph.variable_for(decl).map(|id| self.graph.variable(id))
    }

    pub fn param(&self, decl: ParamId) -> Option<&SemVariable> {
        self.graph.param_for(decl).map(|id| self.graph.variable(id))
    }

    pub fn function(&self, decl: FunctionId) -> Option<&SemFunction> {
        self.graph.function_for(decl).map(|id| self.graph.function(id))
    }

    pub fn struct_type(&self, decl: StructDeclId) -> Option<&StructType> {
        let ty = self.graph.struct_for(decl)?;
        let id = self.graph.types.struct_id(ty)?;
        Some(self.graph.types.struct_type(id))
    }

    /// Human-readable name of `ty`.
    pub fn type_name(&self, ty: Idx, interner: &lumen_ir::StringInterner) -> String {
        self.graph.types.display(ty, interner)
    }
}
