#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use lumen_ir::{
    AstBuilder, BinaryOp, BuiltinValue, ExprId, Module, ParamId, PipelineStage, StmtId,
    StorageClass, StringInterner,
};
use pretty_assertions::assert_eq;

use crate::{resolve, ResolverOptions, UniformityPolicy};

const BARRIER: &str = "'workgroupBarrier' must only be called from uniform control flow";

/// `@compute @workgroup_size(64) fn main(<params>) { <body> }`
fn compute_main(b: &AstBuilder<'_>, params: Vec<ParamId>, body: Vec<StmtId>) {
    let attrs = vec![
        b.stage(PipelineStage::Compute),
        b.workgroup_size(b.lit_int(64), None, None),
    ];
    b.func("main", params, None, body, attrs);
}

fn invocation_index(b: &AstBuilder<'_>) -> ParamId {
    b.param(
        "idx",
        b.ty_u32(),
        vec![b.builtin(BuiltinValue::LocalInvocationIndex)],
    )
}

fn barrier(b: &AstBuilder<'_>) -> StmtId {
    b.call_stmt(b.call("workgroupBarrier", vec![]))
}

fn idx_is_zero(b: &AstBuilder<'_>) -> ExprId {
    b.binary(BinaryOp::Equal, b.ident("idx"), b.lit_u32(0))
}

fn warnings(module: &Module, interner: &StringInterner) -> Vec<String> {
    let program = resolve(module, interner, &ResolverOptions::default()).unwrap();
    program
        .warnings()
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn barrier_under_non_uniform_branch_is_reported() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let params = vec![invocation_index(&b)];
    let body = vec![b.if_(idx_is_zero(&b), vec![barrier(&b)], None)];
    compute_main(&b, params, body);
    let module = b.finish();

    assert_eq!(warnings(&module, &interner), vec![BARRIER.to_owned()]);
}

#[test]
fn uniform_builtin_inputs_are_accepted() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let params = vec![b.param(
        "wid",
        b.ty_vec(3, b.ty_u32()),
        vec![b.builtin(BuiltinValue::WorkgroupId)],
    )];
    let cond = b.binary(BinaryOp::Equal, b.member(b.ident("wid"), "x"), b.lit_u32(0));
    let body = vec![b.if_(cond, vec![barrier(&b)], None)];
    compute_main(&b, params, body);
    let module = b.finish();

    assert!(warnings(&module, &interner).is_empty());
}

#[test]
fn early_return_makes_the_rest_non_uniform() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let params = vec![invocation_index(&b)];
    let body = vec![
        b.if_(idx_is_zero(&b), vec![b.return_()], None),
        barrier(&b),
    ];
    compute_main(&b, params, body);
    let module = b.finish();

    assert_eq!(warnings(&module, &interner), vec![BARRIER.to_owned()]);
}

#[test]
fn variables_written_under_non_uniform_control_flow() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let params = vec![invocation_index(&b)];
    let body = vec![
        b.decl(b.var("x", None, Some(b.lit_int(0)))),
        b.if_(
            idx_is_zero(&b),
            vec![b.assign(b.ident("x"), b.lit_int(1))],
            None,
        ),
        b.if_(
            b.binary(BinaryOp::Equal, b.ident("x"), b.lit_int(1)),
            vec![barrier(&b)],
            None,
        ),
    ];
    compute_main(&b, params, body);
    let module = b.finish();

    assert_eq!(warnings(&module, &interner), vec![BARRIER.to_owned()]);
}

#[test]
fn workgroup_memory_is_non_uniform() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.global(b.var_in("flag", StorageClass::Workgroup, Some(b.ty_u32()), None));
    let cond = b.binary(BinaryOp::Equal, b.ident("flag"), b.lit_u32(0));
    let body = vec![b.if_(cond, vec![barrier(&b)], None)];
    compute_main(&b, vec![], body);
    let module = b.finish();

    assert_eq!(warnings(&module, &interner), vec![BARRIER.to_owned()]);
}

#[test]
fn requirement_propagates_through_user_functions() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    b.func("helper", vec![], None, vec![barrier(&b)], vec![]);
    let params = vec![invocation_index(&b)];
    let body = vec![b.if_(
        idx_is_zero(&b),
        vec![b.call_stmt(b.call("helper", vec![]))],
        None,
    )];
    compute_main(&b, params, body);
    let module = b.finish();

    let program = resolve(&module, &interner, &ResolverOptions::default()).unwrap();
    let warning = &program.warnings()[0];
    assert_eq!(
        warning.message,
        "'helper' must only be called from uniform control flow"
    );
    assert_eq!(
        warning.secondary_messages().collect::<Vec<_>>(),
        vec![
            "control flow depends on a non-uniform value",
            "'helper' requires uniformity because it calls 'workgroupBarrier'",
        ]
    );
}

#[test]
fn policy_controls_severity() {
    let interner = StringInterner::new();
    let b = AstBuilder::new(&interner);
    let params = vec![invocation_index(&b)];
    let body = vec![b.if_(idx_is_zero(&b), vec![barrier(&b)], None)];
    compute_main(&b, params, body);
    let module = b.finish();

    let off = ResolverOptions::new().with_uniformity(UniformityPolicy::Off);
    let program = resolve(&module, &interner, &off).unwrap();
    assert!(program.warnings().is_empty());

    let reject = ResolverOptions::new().with_uniformity(UniformityPolicy::Reject);
    let error = resolve(&module, &interner, &reject).unwrap_err();
    assert!(!error.is_internal());
    assert_eq!(error.error_messages(), vec![BARRIER]);
}
