#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use lumen_diagnostic::{DiagnosticSink, ErrorGuaranteed};
use lumen_ir::{
    AstBuilder, BinaryOp, CallTarget, ExprId, ExprKind, Extension, GlobalDecl, Module,
    StorageClass, StringInterner,
};
use pretty_assertions::assert_eq;

use super::{Decl, DependencyGraph};

fn analyse(
    module: &Module,
    interner: &StringInterner,
) -> (Result<DependencyGraph, ErrorGuaranteed>, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let result = DependencyGraph::build(module, interner, &mut sink);
    (result, sink)
}

fn messages(sink: &DiagnosticSink) -> Vec<String> {
    sink.diagnostics().iter().map(|d| d.message.clone()).collect()
}

fn call_ident_node(module: &Module, call: ExprId) -> lumen_ir::NodeId {
    match module.expr(call).kind {
        ExprKind::Call {
            target: CallTarget::Ident(ident),
            ..
        } => module.ident(ident).id,
        _ => panic!("not an identifier call"),
    }
}

#[test]
fn test_globals_follow_their_dependencies() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let main = b.func(
        "main",
        vec![],
        None,
        vec![b.decl(b.let_("x", None, Some(b.ident("g"))))],
        vec![],
    );
    let g = b.global(b.var_in("g", StorageClass::Private, Some(b.ty_i32()), None));
    let module = b.finish();

    let (graph, _) = analyse(&module, &interner);
    let graph = graph.unwrap();
    assert_eq!(
        graph.ordered_globals(),
        &[GlobalDecl::Variable(g), GlobalDecl::Function(main)]
    );
}

#[test]
fn test_declaration_order_breaks_ties() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let a = b.global(b.const_("a", None, Some(b.lit_int(1))));
    let c = b.global(b.const_("c", None, Some(b.lit_int(2))));
    let module = b.finish();

    let graph = analyse(&module, &interner).0.unwrap();
    assert_eq!(
        graph.ordered_globals(),
        &[GlobalDecl::Variable(a), GlobalDecl::Variable(c)]
    );
}

#[test]
fn test_enables_come_first() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let f = b.func("f", vec![], None, vec![], vec![]);
    let e = b.enable(Extension::F16);
    let module = b.finish();

    let graph = analyse(&module, &interner).0.unwrap();
    assert_eq!(
        graph.ordered_globals(),
        &[GlobalDecl::Enable(e), GlobalDecl::Function(f)]
    );
}

#[test]
fn test_cycle_between_constants() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.global(b.const_("a", None, Some(b.ident("b"))));
    b.global(b.const_("b", None, Some(b.ident("a"))));
    let module = b.finish();

    let (result, sink) = analyse(&module, &interner);
    assert!(result.is_err());
    let diag = &sink.diagnostics()[0];
    assert_eq!(diag.message, "cyclic dependency found: 'a' -> 'b' -> 'a'");
    assert_eq!(
        diag.secondary_messages().collect::<Vec<_>>(),
        vec![
            "const 'a' references const 'b' here",
            "const 'b' references const 'a' here"
        ]
    );
}

#[test]
fn test_recursive_function_is_a_cycle() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.func("f", vec![], None, vec![b.call_stmt(b.call("f", vec![]))], vec![]);
    let module = b.finish();

    let (result, sink) = analyse(&module, &interner);
    assert!(result.is_err());
    let diag = &sink.diagnostics()[0];
    assert_eq!(diag.message, "cyclic dependency found: 'f' -> 'f'");
    assert_eq!(
        diag.secondary_messages().collect::<Vec<_>>(),
        vec!["function 'f' calls function 'f' here"]
    );
}

#[test]
fn test_unknown_names() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.func(
        "f",
        vec![],
        None,
        vec![
            b.decl(b.let_("x", Some(b.ty_named("T")), Some(b.ident("y")))),
            b.call_stmt(b.call("g", vec![])),
        ],
        vec![],
    );
    let module = b.finish();

    let (result, sink) = analyse(&module, &interner);
    assert!(result.is_err());
    assert_eq!(
        messages(&sink),
        vec![
            "unknown type: 'T'",
            "unknown identifier: 'y'",
            "unknown function: 'g'"
        ]
    );
}

#[test]
fn test_builtin_names_stay_unresolved() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let call = b.call("abs", vec![b.lit_int(-1)]);
    b.func(
        "f",
        vec![],
        None,
        vec![b.assign(b.phony(), call)],
        vec![],
    );
    let module = b.finish();

    let graph = analyse(&module, &interner).0.unwrap();
    assert_eq!(graph.resolved(call_ident_node(&module, call)), None);
}

#[test]
fn test_global_redeclaration() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.global(b.const_("a", None, Some(b.lit_int(1))));
    b.func("a", vec![], None, vec![], vec![]);
    let module = b.finish();

    let (result, sink) = analyse(&module, &interner);
    assert!(result.is_err());
    let diag = &sink.diagnostics()[0];
    assert_eq!(diag.message, "redeclaration of 'a'");
    assert_eq!(
        diag.secondary_messages().collect::<Vec<_>>(),
        vec!["'a' previously declared here"]
    );
}

#[test]
fn test_local_redeclaration_in_same_scope() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let p = b.param("a", b.ty_i32(), vec![]);
    b.func(
        "f",
        vec![p],
        None,
        vec![b.decl(b.let_("a", None, Some(b.lit_int(1))))],
        vec![],
    );
    let module = b.finish();

    let (result, sink) = analyse(&module, &interner);
    assert!(result.is_err());
    assert_eq!(messages(&sink), vec!["redeclaration of 'a'"]);
}

#[test]
fn test_shadowing_is_recorded() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let g = b.global(b.var_in("a", StorageClass::Private, Some(b.ty_i32()), None));
    let p = b.param("a", b.ty_i32(), vec![]);
    let inner = b.let_("a", None, Some(b.ident("a")));
    let block = b.block(vec![b.decl(inner)]);
    b.func("f", vec![p], None, vec![block], vec![]);
    let module = b.finish();

    let graph = analyse(&module, &interner).0.unwrap();
    assert_eq!(
        graph.shadows(),
        &[
            (Decl::Param(p), Decl::Variable(g)),
            (Decl::Variable(inner), Decl::Param(p)),
        ]
    );
}

#[test]
fn test_initializer_sees_outer_declaration() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let g = b.global(b.const_("a", None, Some(b.lit_int(1))));
    let init = b.ident("a");
    b.func(
        "f",
        vec![],
        None,
        vec![b.decl(b.let_("a", None, Some(init)))],
        vec![],
    );
    let module = b.finish();

    let graph = analyse(&module, &interner).0.unwrap();
    assert_eq!(
        graph.resolved(module.expr(init).id),
        Some(Decl::Variable(g))
    );
}

#[test]
fn test_continuing_sees_loop_body() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let x = b.var("x", None, Some(b.lit_int(0)));
    let use_x = b.ident("x");
    b.func(
        "f",
        vec![],
        None,
        vec![b.loop_(
            vec![b.decl(x), b.break_()],
            Some(vec![b.assign(b.phony(), use_x)]),
        )],
        vec![],
    );
    let module = b.finish();

    let graph = analyse(&module, &interner).0.unwrap();
    assert_eq!(
        graph.resolved(module.expr(use_x).id),
        Some(Decl::Variable(x))
    );
}

#[test]
fn test_for_initializer_is_scoped_to_loop() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let init = b.decl(b.var("i", None, Some(b.lit_int(0))));
    let cond = b.binary(BinaryOp::LessThan, b.ident("i"), b.lit_int(4));
    let cont = b.increment(b.ident("i"));
    b.func(
        "f",
        vec![],
        None,
        vec![
            b.for_(Some(init), Some(cond), Some(cont), vec![]),
            b.assign(b.phony(), b.ident("i")),
        ],
        vec![],
    );
    let module = b.finish();

    let (result, sink) = analyse(&module, &interner);
    assert!(result.is_err());
    assert_eq!(messages(&sink), vec!["unknown identifier: 'i'"]);
}
