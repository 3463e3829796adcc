//! Semantic graph.
//!
//! Every semantic entity lives in a dense arena owned by [`SemGraph`] and is
//! looked up from its syntax node through a hash map. The graph also owns
//! the type [`Pool`], so a resolved program is a single value.

mod entities;
mod ids;

use std::hash::Hash;

use lumen_ir::{AliasId, ExprId, FunctionId, NodeId, ParamId, StructDeclId, TypeExprId, VariableId};
use rustc_hash::{FxHashMap, FxHashSet};

pub use entities::{
    BindingPoint, CallParam, CallTarget, CallTargetKind, DeclKind, FirstContinue, ParamUsage,
    SemExpr, SemExprKind, SemFunction, SemStmt, SemStmtKind, SemVarKind, SemVariable,
    ShadowTarget, VariableDecl, WorkgroupDim,
};
pub use ids::{CallTargetId, SemExprId, SemFnId, SemStmtId, SemVarId};

use crate::{Idx, Pool};

// ============================================================================
// UniqueVec
// ============================================================================

/// Insertion-ordered set.
#[derive(Clone, Debug)]
pub struct UniqueVec<T> {
    items: Vec<T>,
    seen: FxHashSet<T>,
}

impl<T> Default for UniqueVec<T> {
    fn default() -> Self {
        UniqueVec {
            items: Vec::new(),
            seen: FxHashSet::default(),
        }
    }
}

impl<T: Copy + Eq + Hash> UniqueVec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless already present. Returns `true` if added.
    pub fn add(&mut self, item: T) -> bool {
        if self.seen.insert(item) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.seen.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T: Copy + Eq + Hash> IntoIterator for &'a UniqueVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Copy + Eq + Hash> Extend<T> for UniqueVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

// ============================================================================
// SemGraph
// ============================================================================

/// Semantic information for a whole program.
#[derive(Clone, Debug, Default)]
pub struct SemGraph {
    pub types: Pool,
    variables: Vec<SemVariable>,
    functions: Vec<SemFunction>,
    exprs: Vec<SemExpr>,
    stmts: Vec<SemStmt>,
    call_targets: Vec<CallTarget>,

    expr_map: FxHashMap<ExprId, SemExprId>,
    stmt_map: FxHashMap<NodeId, SemStmtId>,
    variable_map: FxHashMap<VariableId, SemVarId>,
    param_map: FxHashMap<ParamId, SemVarId>,
    function_map: FxHashMap<FunctionId, SemFnId>,
    type_map: FxHashMap<TypeExprId, Idx>,
    struct_map: FxHashMap<StructDeclId, Idx>,
    alias_map: FxHashMap<AliasId, Idx>,
    target_intern: FxHashMap<CallTarget, CallTargetId>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "semantic arenas never exceed u32::MAX entries"
)]
fn next_index(len: usize) -> u32 {
    len as u32
}

impl SemGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Add a variable and map it from its declaration.
    pub fn add_variable(&mut self, var: SemVariable) -> SemVarId {
        let id = SemVarId::new(next_index(self.variables.len()));
        match var.decl {
            VariableDecl::Variable(decl) => self.variable_map.insert(decl, id),
            VariableDecl::Param(decl) => self.param_map.insert(decl, id),
        };
        self.variables.push(var);
        id
    }

    #[inline]
    pub fn variable(&self, id: SemVarId) -> &SemVariable {
        &self.variables[id.index()]
    }

    #[inline]
    pub fn variable_mut(&mut self, id: SemVarId) -> &mut SemVariable {
        &mut self.variables[id.index()]
    }

    pub fn variable_for(&self, decl: VariableId) -> Option<SemVarId> {
        self.variable_map.get(&decl).copied()
    }

    pub fn param_for(&self, decl: ParamId) -> Option<SemVarId> {
        self.param_map.get(&decl).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (SemVarId, &SemVariable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (SemVarId::new(next_index(i)), v))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    pub fn add_function(&mut self, func: SemFunction) -> SemFnId {
        let id = SemFnId::new(next_index(self.functions.len()));
        self.function_map.insert(func.decl, id);
        self.functions.push(func);
        id
    }

    #[inline]
    pub fn function(&self, id: SemFnId) -> &SemFunction {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn function_mut(&mut self, id: SemFnId) -> &mut SemFunction {
        &mut self.functions[id.index()]
    }

    pub fn function_for(&self, decl: FunctionId) -> Option<SemFnId> {
        self.function_map.get(&decl).copied()
    }

    pub fn functions(&self) -> impl Iterator<Item = (SemFnId, &SemFunction)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (SemFnId::new(next_index(i)), f))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Add an expression and map its syntax node to it. A later expression
    /// for the same node (a materialization) takes over the mapping.
    pub fn add_expr(&mut self, expr: SemExpr) -> SemExprId {
        let id = SemExprId::new(next_index(self.exprs.len()));
        self.expr_map.insert(expr.decl, id);
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn expr(&self, id: SemExprId) -> &SemExpr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn expr_mut(&mut self, id: SemExprId) -> &mut SemExpr {
        &mut self.exprs[id.index()]
    }

    pub fn expr_for(&self, decl: ExprId) -> Option<SemExprId> {
        self.expr_map.get(&decl).copied()
    }

    /// The expression beneath any materialization.
    pub fn unwrap_materialize(&self, mut id: SemExprId) -> SemExprId {
        while let SemExprKind::Materialize { inner } = self.exprs[id.index()].kind {
            id = inner;
        }
        id
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn add_stmt(&mut self, stmt: SemStmt) -> SemStmtId {
        let id = SemStmtId::new(next_index(self.stmts.len()));
        self.stmt_map.insert(stmt.decl, id);
        self.stmts.push(stmt);
        id
    }

    #[inline]
    pub fn stmt(&self, id: SemStmtId) -> &SemStmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn stmt_mut(&mut self, id: SemStmtId) -> &mut SemStmt {
        &mut self.stmts[id.index()]
    }

    pub fn stmt_for(&self, decl: NodeId) -> Option<SemStmtId> {
        self.stmt_map.get(&decl).copied()
    }

    /// Nearest ancestor of `id` (including `id`) whose kind satisfies
    /// `pred`.
    pub fn find_first_parent(
        &self,
        id: SemStmtId,
        pred: impl Fn(SemStmtKind) -> bool,
    ) -> Option<SemStmtId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let stmt = &self.stmts[cur.index()];
            if pred(stmt.kind) {
                return Some(cur);
            }
            current = stmt.parent;
        }
        None
    }

    // ========================================================================
    // Call Targets
    // ========================================================================

    /// Intern a call target. Identical signatures share one id.
    pub fn intern_call_target(&mut self, target: CallTarget) -> CallTargetId {
        if let Some(&id) = self.target_intern.get(&target) {
            return id;
        }
        let id = CallTargetId::new(next_index(self.call_targets.len()));
        self.call_targets.push(target.clone());
        self.target_intern.insert(target, id);
        id
    }

    #[inline]
    pub fn call_target(&self, id: CallTargetId) -> &CallTarget {
        &self.call_targets[id.index()]
    }

    pub fn call_target_count(&self) -> usize {
        self.call_targets.len()
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn set_type_for(&mut self, decl: TypeExprId, ty: Idx) {
        self.type_map.insert(decl, ty);
    }

    pub fn type_for(&self, decl: TypeExprId) -> Option<Idx> {
        self.type_map.get(&decl).copied()
    }

    pub fn set_struct_for(&mut self, decl: StructDeclId, ty: Idx) {
        self.struct_map.insert(decl, ty);
    }

    pub fn struct_for(&self, decl: StructDeclId) -> Option<Idx> {
        self.struct_map.get(&decl).copied()
    }

    pub fn set_alias_for(&mut self, decl: AliasId, ty: Idx) {
        self.alias_map.insert(decl, ty);
    }

    pub fn alias_for(&self, decl: AliasId) -> Option<Idx> {
        self.alias_map.get(&decl).copied()
    }
}

#[cfg(test)]
mod tests;
