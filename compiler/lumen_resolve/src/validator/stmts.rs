//! Statement rules: control flow placement, assignments and switches.

use lumen_diagnostic::ErrorCode;
use lumen_ir::Span;
use lumen_sem::{Behaviors, Constant, Idx, SemStmtId, SemStmtKind, TypeKind};
use rustc_hash::FxHashMap;

use super::{Valid, Validator};

/// A resolved `case` clause, reduced to what the switch rules look at.
#[derive(Clone, Debug)]
pub(crate) struct SwitchCase {
    /// Constant selector values; empty for `default`.
    pub selectors: Vec<(i64, Span)>,
    pub is_default: bool,
    pub span: Span,
}

const CONTINUING_BREAK: &str = "break statement in a continuing block must be the single \
     statement of an if statement's true-branch or false-branch, and the if statement must be \
     the last statement of the continuing block";

impl Validator<'_> {
    /// The `continuing` block enclosing `stmt`. With `stop_at_loop`, a loop
    /// nested inside the continuing block hides it.
    fn closest_continuing(&self, stmt: SemStmtId, stop_at_loop: bool) -> Option<SemStmtId> {
        let mut current = Some(stmt);
        while let Some(id) = current {
            let s = self.graph.stmt(id);
            if s.kind == SemStmtKind::LoopContinuingBlock {
                return Some(id);
            }
            if stop_at_loop && s.kind.is_loop() {
                return None;
            }
            current = s.parent;
        }
        None
    }

    // ========================================================================
    // Control Flow
    // ========================================================================

    /// `break_if_form`: the break is the whole branch of an `if` that ends
    /// its continuing block.
    pub(crate) fn break_stmt(&mut self, stmt: SemStmtId, break_if_form: bool, span: Span) -> Valid {
        let target = self.graph.find_first_parent(stmt, |k| {
            matches!(
                k,
                SemStmtKind::LoopBlock | SemStmtKind::CaseBlock | SemStmtKind::Case
            )
        });
        if target.is_none() {
            return Err(self.error(
                ErrorCode::E2014,
                "break statement must be in a loop or switch case",
                span,
            ));
        }
        if self.closest_continuing(stmt, true).is_some() && !break_if_form {
            return Err(self.error(ErrorCode::E2014, CONTINUING_BREAK, span));
        }
        Ok(())
    }

    pub(crate) fn continue_stmt(&mut self, stmt: SemStmtId, span: Span) -> Valid {
        if self.closest_continuing(stmt, true).is_some() {
            return Err(self.error(
                ErrorCode::E2014,
                "continuing blocks must not contain a continue statement",
                span,
            ));
        }
        let in_loop = self
            .graph
            .find_first_parent(stmt, |k| k == SemStmtKind::LoopBlock)
            .is_some();
        if !in_loop {
            return Err(self.error(
                ErrorCode::E2014,
                "continue statement must be in a loop",
                span,
            ));
        }
        Ok(())
    }

    pub(crate) fn discard_stmt(&mut self, stmt: SemStmtId, span: Span) -> Valid {
        if self.closest_continuing(stmt, false).is_some() {
            return Err(self.error(
                ErrorCode::E2014,
                "continuing blocks must not contain a discard statement",
                span,
            ));
        }
        Ok(())
    }

    pub(crate) fn fallthrough_stmt(&mut self, case_tail: bool, last_case: bool, span: Span) -> Valid {
        if !case_tail {
            return Err(self.error(
                ErrorCode::E2014,
                "fallthrough must only be used as the last statement of a case block",
                span,
            ));
        }
        if last_case {
            return Err(self.error(
                ErrorCode::E2014,
                "a fallthrough statement must not be used in the last switch case",
                span,
            ));
        }
        Ok(())
    }

    /// `value` is `Idx::VOID` for a bare `return;`.
    pub(crate) fn return_stmt(
        &mut self,
        stmt: SemStmtId,
        expected: Idx,
        value: Idx,
        span: Span,
    ) -> Valid {
        if value != expected {
            return Err(self.error(
                ErrorCode::E2001,
                format!(
                    "return statement type must match its function return type, returned '{}', \
                     expected '{}'",
                    self.type_name(value),
                    self.type_name(expected)
                ),
                span,
            ));
        }
        if self.closest_continuing(stmt, false).is_some() {
            return Err(self.error(
                ErrorCode::E2014,
                "continuing blocks must not contain a return statement",
                span,
            ));
        }
        Ok(())
    }

    /// A non-void function must not fall off its end.
    pub(crate) fn function_end(&mut self, return_type: Idx, behaviors: Behaviors, span: Span) -> Valid {
        if return_type == Idx::VOID || !behaviors.contains(Behaviors::NEXT) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2014,
            "missing return at end of function",
            span.end_point(),
        ))
    }

    pub(crate) fn condition(&mut self, what: &str, ty: Idx, span: Span) -> Valid {
        if ty == Idx::BOOL {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2001,
            format!("{what} condition must be bool, got '{}'", self.type_name(ty)),
            span,
        ))
    }

    pub(crate) fn unreachable(&mut self, span: Span) {
        self.sink
            .add_warning(ErrorCode::E2014, "code is unreachable", span);
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    /// `lhs` is the unloaded type of the target; `rhs` the loaded value type.
    pub(crate) fn assignment(&mut self, lhs: Idx, rhs: Idx, lhs_span: Span, rhs_span: Span) -> Valid {
        let TypeKind::Reference { store, access, .. } = self.pool().kind(lhs) else {
            return Err(self.error(
                ErrorCode::E2001,
                format!("cannot assign to value of type '{}'", self.type_name(lhs)),
                lhs_span,
            ));
        };
        if !self.pool().is_constructible(store) {
            return Err(self.error(
                ErrorCode::E2001,
                "storage type of assignment must be constructible",
                lhs_span,
            ));
        }
        if !access.can_write() {
            return Err(self.error(
                ErrorCode::E2001,
                format!("cannot store into a read-only type '{}'", self.type_name(lhs)),
                lhs_span,
            ));
        }
        if store != rhs {
            return Err(self.error(
                ErrorCode::E2001,
                format!(
                    "cannot assign '{}' to '{}'",
                    self.type_name(rhs),
                    self.type_name(store)
                ),
                rhs_span,
            ));
        }
        Ok(())
    }

    /// `_ = value` discards any constructible, pointer or handle value.
    pub(crate) fn phony_assignment(&mut self, rhs: Idx, span: Span) -> Valid {
        let pool = self.pool();
        if pool.is_constructible(rhs)
            || pool.is_handle(rhs)
            || matches!(pool.kind(rhs), TypeKind::Pointer { .. })
        {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2001,
            format!(
                "cannot assign '{}' to '_'. '_' can only be assigned a constructible, pointer, \
                 texture or sampler type",
                self.type_name(rhs)
            ),
            span,
        ))
    }

    pub(crate) fn increment(&mut self, lhs: Idx, span: Span) -> Valid {
        let TypeKind::Reference { store, access, .. } = self.pool().kind(lhs) else {
            return Err(self.error(
                ErrorCode::E2001,
                format!("cannot modify value of type '{}'", self.type_name(lhs)),
                span,
            ));
        };
        if !self.pool().is_integer_scalar(store) {
            return Err(self.error(
                ErrorCode::E2001,
                "increment statement can only be applied to an integer scalar",
                span,
            ));
        }
        if !access.can_write() {
            return Err(self.error(
                ErrorCode::E2001,
                format!("cannot modify read-only type '{}'", self.type_name(lhs)),
                span,
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Switch
    // ========================================================================

    pub(crate) fn switch(&mut self, cond: Idx, cond_span: Span, cases: &[SwitchCase], span: Span) -> Valid {
        if !self.pool().is_integer_scalar(cond) || self.pool().is_abstract(cond) {
            return Err(self.error(
                ErrorCode::E2001,
                "switch statement selector expression must be of a scalar integer type",
                cond_span,
            ));
        }

        let mut default: Option<Span> = None;
        let mut seen: FxHashMap<i64, Span> = FxHashMap::default();
        for case in cases {
            if case.is_default {
                if let Some(first) = default {
                    let guarantee = self.error(
                        ErrorCode::E2014,
                        "switch statement must have exactly one default clause",
                        case.span,
                    );
                    self.note("previous default case", first);
                    return Err(guarantee);
                }
                default = Some(case.span);
            }
            for &(value, selector_span) in &case.selectors {
                if let Some(&previous) = seen.get(&value) {
                    let guarantee = self.error(
                        ErrorCode::E2014,
                        format!("duplicate switch case '{value}'"),
                        selector_span,
                    );
                    self.note("previous case declared here", previous);
                    return Err(guarantee);
                }
                seen.insert(value, selector_span);
            }
        }
        if default.is_none() {
            return Err(self.error(
                ErrorCode::E2014,
                "switch statement must have a default clause",
                span,
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Static Assertions
    // ========================================================================

    pub(crate) fn static_assert(&mut self, ty: Idx, value: Option<&Constant>, span: Span) -> Valid {
        if ty != Idx::BOOL {
            return Err(self.error(
                ErrorCode::E2015,
                format!(
                    "static assertion condition must be bool, got '{}'",
                    self.type_name(ty)
                ),
                span,
            ));
        }
        let Some(value) = value.and_then(Constant::as_bool) else {
            return Err(self.error(
                ErrorCode::E2015,
                "static assertion condition must be a constant expression",
                span,
            ));
        };
        if value {
            return Ok(());
        }
        Err(self.error(ErrorCode::E2015, "static assertion failed", span))
    }
}
