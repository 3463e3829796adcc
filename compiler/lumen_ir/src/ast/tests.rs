use pretty_assertions::assert_eq;

use crate::{AstBuilder, StringInterner};

use super::*;

#[test]
fn test_node_kind_names() {
    assert_eq!(NodeKind::Case.to_string(), "CaseStatement");
    assert_eq!(NodeKind::Expression.as_str(), "Expression");
}

#[test]
fn test_node_out_of_range_is_dummy() {
    let module = Module::default();
    let info = module.node(NodeId::new(42));
    assert_eq!(info.span, Span::DUMMY);
}

#[test]
fn test_global_span_and_node() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let var = b.global(b.const_("c", None, Some(b.lit_int(1))));
    let assert = b.global_static_assert(b.lit_bool(true));
    let module = b.finish();

    let decl = GlobalDecl::Variable(var);
    assert_eq!(module.global_span(decl), module.variable(var).span);
    assert_eq!(module.node(module.global_node(decl)).kind, NodeKind::Variable);

    let decl = GlobalDecl::StaticAssert(assert);
    assert_eq!(module.node(module.global_node(decl)).kind, NodeKind::Statement);
}

#[test]
fn test_children_left_to_right() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let lhs = b.lit_int(1);
    let rhs = b.lit_int(2);
    let sum = b.binary(BinaryOp::Add, lhs, rhs);
    let module = b.finish();

    assert_eq!(module.expr(sum).kind.children(), vec![lhs, rhs]);
    assert_eq!(module.expr(lhs).kind.children(), vec![]);
}

#[test]
fn test_variable_keywords() {
    assert_eq!(VariableKind::Let.keyword(), "let");
    assert_eq!(
        VariableKind::Var {
            storage_class: None,
            access: None
        }
        .keyword(),
        "var"
    );
    assert_eq!(AttributeKind::Invariant.name(), "invariant");
}
