use lumen_ir::{ExprId, NodeId};
use pretty_assertions::assert_eq;
use smallvec::smallvec;

use super::*;
use crate::{Behaviors, EvaluationStage};

fn plain_expr(decl: u32, ty: Idx) -> SemExpr {
    SemExpr {
        decl: ExprId::new(decl),
        kind: SemExprKind::Plain,
        ty,
        stage: EvaluationStage::Constant,
        constant: None,
        stmt: None,
        has_side_effects: false,
        behaviors: Behaviors::NEXT,
        source_variable: None,
    }
}

fn stmt(decl: u32, kind: SemStmtKind, parent: Option<SemStmtId>) -> SemStmt {
    SemStmt {
        decl: NodeId::new(decl),
        kind,
        parent,
        function: None,
        reachable: true,
        behaviors: Behaviors::NEXT,
        decls: Vec::new(),
        first_continue: None,
    }
}

#[test]
fn unique_vec_keeps_first_insertion_order() {
    let mut v = UniqueVec::new();
    assert!(v.add(3));
    assert!(v.add(1));
    assert!(!v.add(3));
    v.extend([2, 1, 4]);
    assert_eq!(v.as_slice(), &[3, 1, 2, 4]);
    assert!(v.contains(&2));
    assert_eq!(v.len(), 4);
}

#[test]
fn later_expression_takes_over_syntax_node() {
    let mut graph = SemGraph::new();
    let inner = graph.add_expr(plain_expr(7, Idx::ABSTRACT_INT));
    assert_eq!(graph.expr_for(ExprId::new(7)), Some(inner));

    let mut outer = plain_expr(7, Idx::I32);
    outer.kind = SemExprKind::Materialize { inner };
    let outer = graph.add_expr(outer);

    assert_eq!(graph.expr_for(ExprId::new(7)), Some(outer));
    assert_eq!(graph.unwrap_materialize(outer), inner);
    assert_eq!(graph.expr_count(), 2);
}

#[test]
fn find_first_parent_walks_up() {
    let mut graph = SemGraph::new();
    let func = graph.add_stmt(stmt(1, SemStmtKind::FunctionBlock, None));
    let lp = graph.add_stmt(stmt(2, SemStmtKind::Loop, Some(func)));
    let body = graph.add_stmt(stmt(3, SemStmtKind::LoopBlock, Some(lp)));
    let cont = graph.add_stmt(stmt(4, SemStmtKind::LoopContinuingBlock, Some(body)));

    assert_eq!(
        graph.find_first_parent(cont, |k| k == SemStmtKind::LoopBlock),
        Some(body)
    );
    assert_eq!(graph.find_first_parent(cont, SemStmtKind::is_loop), Some(lp));
    assert_eq!(
        graph.find_first_parent(body, |k| k == SemStmtKind::Switch),
        None
    );
    assert_eq!(graph.stmt_for(NodeId::new(3)), Some(body));
}

#[test]
fn call_targets_are_interned() {
    let mut graph = SemGraph::new();
    let target = CallTarget {
        kind: CallTargetKind::ValueConstructor(Idx::F32),
        params: smallvec![CallParam {
            ty: Idx::F32,
            usage: ParamUsage::None,
        }],
        return_type: Idx::F32,
        stage: EvaluationStage::Constant,
    };
    let a = graph.intern_call_target(target.clone());
    let b = graph.intern_call_target(target.clone());
    assert_eq!(a, b);

    let runtime = CallTarget {
        stage: EvaluationStage::Runtime,
        ..target
    };
    let c = graph.intern_call_target(runtime);
    assert_ne!(a, c);
    assert_eq!(graph.call_target_count(), 2);
    assert!(graph.call_target(a).kind.is_constructor_or_conversion());
}

#[test]
fn stmt_kind_classes() {
    assert!(SemStmtKind::LoopContinuingBlock.is_block());
    assert!(!SemStmtKind::Loop.is_block());
    assert!(SemStmtKind::While.is_loop());
    assert!(!SemStmtKind::Switch.is_loop());
}
