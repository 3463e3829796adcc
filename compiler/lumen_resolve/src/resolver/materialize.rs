//! Materialization of abstract-typed values.

use lumen_diagnostic::ErrorCode;
use lumen_sem::{Idx, SemExpr, SemExprId, SemExprKind};

use super::Resolver;
use crate::const_eval::{ConstEval, EvalError};
use crate::error::{InternalError, ResolveResult};

impl Resolver<'_> {
    /// Convert an abstract-typed expression to `target`, or to its default
    /// concrete type when `target` is `None`.
    ///
    /// Returns `expr` unchanged when there is nothing to do: the expression
    /// is already concrete, already of the target type, or the target is
    /// itself abstract. Otherwise a `Materialize` node replaces `expr` as the
    /// semantic entity of its syntax node, so materializing twice is a no-op.
    pub(super) fn materialize(
        &mut self,
        expr: SemExprId,
        target: Option<Idx>,
    ) -> ResolveResult<SemExprId> {
        let ty = self.graph.expr(expr).ty;
        if !self.pool().is_abstract(ty) {
            return Ok(expr);
        }
        let target = match target {
            Some(target) => target,
            None => self.graph.types.concrete(ty),
        };
        if target == ty || self.pool().is_abstract(target) {
            return Ok(expr);
        }

        let span = self.expr_span(expr);
        self.validator().materialize(ty, target, span)?;

        // Abstract values only come from constant expressions.
        let Some(value) = self.graph.expr(expr).constant.clone() else {
            return Err(InternalError::MaterializeNonConstant { span }.into());
        };
        let converted = match ConstEval::new(self.pool(), self.interner).convert(&value, target) {
            Ok(converted) => converted,
            Err(EvalError::Unsupported(_)) => {
                return Err(InternalError::ConversionWithoutValue {
                    from: self.type_name(ty),
                    to: self.type_name(target),
                    span,
                }
                .into());
            }
            Err(err) => return Err(self.error(ErrorCode::E2018, err.to_string(), span)),
        };

        let inner = self.graph.expr(expr);
        let materialized = SemExpr {
            decl: inner.decl,
            kind: SemExprKind::Materialize { inner: expr },
            ty: target,
            stage: inner.stage,
            constant: Some(converted),
            stmt: inner.stmt,
            has_side_effects: inner.has_side_effects,
            behaviors: inner.behaviors,
            source_variable: None,
        };
        Ok(self.graph.add_expr(materialized))
    }

    /// Materialize each of `args` to the matching parameter type.
    pub(super) fn materialize_args(
        &mut self,
        args: &[SemExprId],
        params: &[Idx],
    ) -> ResolveResult<Vec<SemExprId>> {
        args.iter()
            .zip(params)
            .map(|(&arg, &param)| self.materialize(arg, Some(param)))
            .collect()
    }
}
