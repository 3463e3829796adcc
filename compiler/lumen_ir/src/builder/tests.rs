#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_every_node_gets_a_distinct_span() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let sum = b.binary(BinaryOp::Add, b.lit_int(1), b.lit_int(2));
    let stmt = b.return_value(sum);
    b.func("f", vec![], Some(b.ty_i32()), vec![stmt], vec![]);
    let module = b.finish();

    let mut spans: Vec<Span> = module.nodes().map(|(_, info)| info.span).collect();
    let total = spans.len();
    spans.sort_by_key(|span| span.start);
    spans.dedup();
    assert_eq!(spans.len(), total);
}

#[test]
fn test_root_is_node_zero() {
    let interner = StringInterner::new();
    let module = AstBuilder::new(&interner).finish();
    assert_eq!(module.root(), NodeId::new(0));
    assert_eq!(module.node(module.root()).kind, NodeKind::Module);
    assert_eq!(module.node_count(), 1);
}

#[test]
fn test_globals_keep_declaration_order() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let member = b.struct_member("a", b.ty_f32(), vec![]);
    let s = b.structure("S", vec![member]);
    let v = b.global(b.var_in("g", StorageClass::Private, Some(b.ty_f32()), None));
    let f = b.func("main", vec![], None, vec![], vec![]);
    let module = b.finish();

    assert_eq!(
        module.globals(),
        &[
            GlobalDecl::Struct(s),
            GlobalDecl::Variable(v),
            GlobalDecl::Function(f)
        ]
    );
}

#[test]
fn test_stage_attribute_marks_entry_point() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let stage = b.stage(PipelineStage::Fragment);
    let entry = b.func("frag", vec![], None, vec![], vec![stage]);
    let helper = b.func("helper", vec![], None, vec![], vec![]);
    let module = b.finish();

    assert_eq!(
        module.function(entry).stage,
        Some(PipelineStage::Fragment)
    );
    assert!(module.function(entry).is_entry_point());
    assert!(!module.function(helper).is_entry_point());
}

#[test]
fn test_function_body_is_block() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let ret = b.return_();
    let f = b.func("f", vec![], None, vec![ret], vec![]);
    let module = b.finish();

    let body = module.stmt(module.function(f).body);
    assert_eq!(body.kind, StmtKind::Block(vec![ret]));
}

#[test]
fn test_call_allocates_identifier_node() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let call = b.call("max", vec![b.lit_int(1), b.lit_int(2)]);
    let module = b.finish();

    let ExprKind::Call {
        target: CallTarget::Ident(ident),
        args,
    } = &module.expr(call).kind
    else {
        panic!("expected identifier call");
    };
    assert_eq!(args.len(), 2);
    let ident = module.ident(*ident);
    assert_eq!(interner.lookup(ident.name), "max");
    assert_eq!(module.node(ident.id).kind, NodeKind::Identifier);
}

#[test]
fn test_literal_suffixes() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let a = b.lit_i32(-3);
    let u = b.lit_u32(7);
    let h = b.lit_f16(0.5);
    let module = b.finish();

    assert_eq!(
        module.expr(a).kind,
        ExprKind::Literal(Literal::Int {
            value: -3,
            suffix: IntSuffix::I
        })
    );
    assert_eq!(
        module.expr(u).kind,
        ExprKind::Literal(Literal::Int {
            value: 7,
            suffix: IntSuffix::U
        })
    );
    assert_eq!(
        module.expr(h).kind,
        ExprKind::Literal(Literal::float(0.5, FloatSuffix::H))
    );
}

#[test]
fn test_switch_cases() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let one = b.case(vec![b.lit_int(1)], vec![b.break_()]);
    let default = b.default_case(vec![]);
    let switch = b.switch(b.ident("x"), vec![one, default]);
    let module = b.finish();

    let StmtKind::Switch { cases, .. } = &module.stmt(switch).kind else {
        panic!("expected switch");
    };
    assert!(!module.case(cases[0]).is_default());
    assert!(module.case(cases[1]).is_default());
    assert_eq!(module.node(module.case(cases[1]).id).kind, NodeKind::Case);
    let body = module.stmt(module.case(cases[0]).body);
    assert!(matches!(body.kind, StmtKind::Block(ref stmts) if stmts.len() == 1));
    assert_eq!(interner.get("x").unwrap(), interner.intern("x"));
}
