use lumen_diagnostic::DiagnosticSink;
use lumen_ir::{Access, Extension, Module, Span, StorageClass, StringInterner};
use lumen_sem::{Behaviors, Constant, Idx, SemGraph};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;

use super::{SwitchCase, Validator};

fn run<R>(
    graph: &SemGraph,
    enabled: &[Extension],
    check: impl FnOnce(&mut Validator<'_>) -> R,
) -> (R, Vec<String>) {
    let module = Module::default();
    let interner = StringInterner::new();
    let enabled: FxHashSet<Extension> = enabled.iter().copied().collect();
    let mut sink = DiagnosticSink::new();
    let result = {
        let mut validator = Validator::new(&module, &interner, graph, &mut sink, &enabled);
        check(&mut validator)
    };
    let messages = sink
        .diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect();
    (result, messages)
}

fn span(start: u32) -> Span {
    Span::new(start, start + 1)
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn vector_elements_must_be_concrete_scalars() {
    let mut graph = SemGraph::new();
    let v2 = graph.types.vector(Idx::F32, 2);

    let (ok, messages) = run(&graph, &[], |v| v.vector_elem(Idx::U32, span(0)));
    assert!(ok.is_ok());
    assert!(messages.is_empty());

    let (err, messages) = run(&graph, &[], |v| v.vector_elem(v2, span(0)));
    assert!(err.is_err());
    assert_eq!(
        messages,
        vec!["vector element type must be 'bool', 'f32', 'f16', 'i32' or 'u32'".to_owned()]
    );

    let (abstract_elem, _) = run(&graph, &[], |v| v.vector_elem(Idx::ABSTRACT_INT, span(0)));
    assert!(abstract_elem.is_err());
}

#[test]
fn matrix_and_atomic_elements() {
    let graph = SemGraph::new();
    let (results, messages) = run(&graph, &[], |v| {
        (
            v.matrix_elem(Idx::F16, span(0)).is_ok(),
            v.matrix_elem(Idx::I32, span(1)).is_ok(),
            v.atomic_elem(Idx::U32, span(2)).is_ok(),
            v.atomic_elem(Idx::F32, span(3)).is_ok(),
        )
    });
    assert_eq!(results, (true, false, true, false));
    assert_eq!(
        messages,
        vec![
            "matrix element type must be 'f32' or 'f16'".to_owned(),
            "atomic only supports i32 or u32 types".to_owned(),
        ]
    );
}

#[test]
fn extensions_must_be_enabled() {
    let graph = SemGraph::new();
    let (err, messages) = run(&graph, &[], |v| {
        v.require_extension(Extension::F16, "f16 type", span(0))
    });
    assert!(err.is_err());
    assert_eq!(
        messages,
        vec!["f16 type used without 'f16' extension enabled".to_owned()]
    );

    let (ok, _) = run(&graph, &[Extension::F16], |v| {
        v.require_extension(Extension::F16, "f16 type", span(0))
    });
    assert!(ok.is_ok());
}

#[test]
fn array_stride_must_cover_the_element() {
    let mut graph = SemGraph::new();
    let v3 = graph.types.vector(Idx::F32, 3);
    let (results, _) = run(&graph, &[], |v| {
        (
            v.array_stride(v3, 16, span(0)).is_ok(),
            v.array_stride(v3, 32, span(0)).is_ok(),
            v.array_stride(v3, 12, span(0)).is_ok(),
            v.array_stride(v3, 20, span(0)).is_ok(),
        )
    });
    assert_eq!(results, (true, true, false, false));
}

#[test]
fn bitcast_requires_matching_widths() {
    let mut graph = SemGraph::new();
    let v2f = graph.types.vector(Idx::F32, 2);
    let v2u = graph.types.vector(Idx::U32, 2);
    let v3u = graph.types.vector(Idx::U32, 3);

    let (results, messages) = run(&graph, &[], |v| {
        (
            v.bitcast(Idx::F32, Idx::U32, span(0)).is_ok(),
            v.bitcast(v2f, v2u, span(0)).is_ok(),
            v.bitcast(v2f, v3u, span(0)).is_ok(),
            v.bitcast(Idx::BOOL, Idx::U32, span(0)).is_ok(),
        )
    });
    assert_eq!(results, (true, true, false, false));
    assert_eq!(
        messages,
        vec![
            "cannot bitcast from 'vec2<f32>' to 'vec3<u32>'".to_owned(),
            "cannot bitcast from 'bool' to 'u32'".to_owned(),
        ]
    );
}

#[test]
fn materialize_follows_conversion_ranks() {
    let graph = SemGraph::new();
    let (results, messages) = run(&graph, &[], |v| {
        (
            v.materialize(Idx::ABSTRACT_INT, Idx::U32, span(0)).is_ok(),
            v.materialize(Idx::ABSTRACT_FLOAT, Idx::I32, span(0)).is_ok(),
        )
    });
    assert_eq!(results, (true, false));
    assert_eq!(
        messages,
        vec!["cannot convert value of type 'abstract-float' to type 'i32'".to_owned()]
    );
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn struct_layout_limits() {
    let mut graph = SemGraph::new();
    let runtime = graph.types.array_of(Idx::U32, lumen_sem::ArrayCount::Runtime);
    let (results, messages) = run(&graph, &[], |v| {
        (
            v.struct_member_type(runtime, true, span(0)).is_ok(),
            v.struct_member_type(runtime, false, span(1)).is_ok(),
            v.member_align(8, span(2)).is_ok(),
            v.member_align(12, span(3)).is_ok(),
            v.member_size(4, 16, span(4)).is_ok(),
            v.byte_limit("struct size", u64::from(u32::MAX) + 1, span(5)).is_ok(),
        )
    });
    assert_eq!(results, (true, false, true, false, false, false));
    assert_eq!(
        messages,
        vec![
            "runtime arrays may only appear as the last member of a struct".to_owned(),
            "'align' value must be a positive, power-of-two integer".to_owned(),
            "size must be at least as big as the type's size (16)".to_owned(),
            "struct size (0x100000000) must not exceed 0xffffffff bytes".to_owned(),
        ]
    );
}

#[test]
fn override_ids_are_bounded_and_unique() {
    let graph = SemGraph::new();
    let (results, messages) = run(&graph, &[], |v| {
        (
            v.override_id(65535, span(0)).is_ok(),
            v.override_id(65536, span(1)).is_ok(),
            v.duplicate_override_id(7, span(2), span(3)).is_ok(),
        )
    });
    assert_eq!(results, (true, false, false));
    assert_eq!(
        messages,
        vec![
            "'id' must be between 0 and 65535".to_owned(),
            "@id values must be unique".to_owned(),
        ]
    );
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn assignment_targets_must_be_writable_references() {
    let mut graph = SemGraph::new();
    let rw = graph
        .types
        .reference(Idx::I32, StorageClass::Function, Access::ReadWrite);
    let ro = graph
        .types
        .reference(Idx::I32, StorageClass::Uniform, Access::Read);

    let (results, messages) = run(&graph, &[], |v| {
        (
            v.assignment(rw, Idx::I32, span(0), span(1)).is_ok(),
            v.assignment(Idx::I32, Idx::I32, span(0), span(1)).is_ok(),
            v.assignment(ro, Idx::I32, span(0), span(1)).is_ok(),
            v.assignment(rw, Idx::U32, span(0), span(1)).is_ok(),
        )
    });
    assert_eq!(results, (true, false, false, false));
    assert_eq!(
        messages,
        vec![
            "cannot assign to value of type 'i32'".to_owned(),
            "cannot store into a read-only type 'ref<uniform, i32, read>'".to_owned(),
            "cannot assign 'u32' to 'i32'".to_owned(),
        ]
    );
}

#[test]
fn increment_needs_an_integer_reference() {
    let mut graph = SemGraph::new();
    let float_ref = graph
        .types
        .reference(Idx::F32, StorageClass::Function, Access::ReadWrite);
    let (err, messages) = run(&graph, &[], |v| v.increment(float_ref, span(0)));
    assert!(err.is_err());
    assert_eq!(
        messages,
        vec!["increment statement can only be applied to an integer scalar".to_owned()]
    );
}

#[test]
fn switch_rules() {
    let graph = SemGraph::new();
    let default = |at: u32| SwitchCase {
        selectors: Vec::new(),
        is_default: true,
        span: span(at),
    };
    let case = |values: &[i64], at: u32| SwitchCase {
        selectors: values.iter().map(|&v| (v, span(at))).collect(),
        is_default: false,
        span: span(at),
    };

    let (ok, _) = run(&graph, &[], |v| {
        v.switch(Idx::I32, span(0), &[case(&[1, 2], 1), default(2)], span(0))
    });
    assert!(ok.is_ok());

    let (_, messages) = run(&graph, &[], |v| {
        v.switch(Idx::I32, span(0), &[case(&[1], 1), case(&[1], 2), default(3)], span(0))
    });
    assert_eq!(messages, vec!["duplicate switch case '1'".to_owned()]);

    let (_, messages) = run(&graph, &[], |v| {
        v.switch(Idx::U32, span(0), &[case(&[1], 1)], span(0))
    });
    assert_eq!(
        messages,
        vec!["switch statement must have a default clause".to_owned()]
    );

    let (_, messages) = run(&graph, &[], |v| {
        v.switch(Idx::U32, span(0), &[default(1), default(2)], span(0))
    });
    assert_eq!(
        messages,
        vec!["switch statement must have exactly one default clause".to_owned()]
    );

    let (_, messages) = run(&graph, &[], |v| {
        v.switch(Idx::F32, span(0), &[default(1)], span(0))
    });
    assert_eq!(
        messages,
        vec!["switch statement selector expression must be of a scalar integer type".to_owned()]
    );
}

#[test]
fn static_assertions() {
    let graph = SemGraph::new();
    let (results, messages) = run(&graph, &[], |v| {
        (
            v.static_assert(Idx::BOOL, Some(&Constant::bool(true)), span(0)).is_ok(),
            v.static_assert(Idx::BOOL, Some(&Constant::bool(false)), span(1)).is_ok(),
            v.static_assert(Idx::BOOL, None, span(2)).is_ok(),
            v.static_assert(Idx::I32, None, span(3)).is_ok(),
        )
    });
    assert_eq!(results, (true, false, false, false));
    assert_eq!(
        messages,
        vec![
            "static assertion failed".to_owned(),
            "static assertion condition must be a constant expression".to_owned(),
            "static assertion condition must be bool, got 'i32'".to_owned(),
        ]
    );
}

#[test]
fn missing_return_only_for_non_void_functions() {
    let graph = SemGraph::new();
    let (results, messages) = run(&graph, &[], |v| {
        (
            v.function_end(Idx::VOID, Behaviors::NEXT, span(0)).is_ok(),
            v.function_end(Idx::I32, Behaviors::RETURN, span(0)).is_ok(),
            v.function_end(Idx::I32, Behaviors::NEXT | Behaviors::RETURN, span(0)).is_ok(),
        )
    });
    assert_eq!(results, (true, true, false));
    assert_eq!(messages, vec!["missing return at end of function".to_owned()]);
}

#[test]
fn fallthrough_placement() {
    let graph = SemGraph::new();
    let (results, messages) = run(&graph, &[], |v| {
        (
            v.fallthrough_stmt(true, false, span(0)).is_ok(),
            v.fallthrough_stmt(false, false, span(1)).is_ok(),
            v.fallthrough_stmt(true, true, span(2)).is_ok(),
        )
    });
    assert_eq!(results, (true, false, false));
    assert_eq!(
        messages,
        vec![
            "fallthrough must only be used as the last statement of a case block".to_owned(),
            "a fallthrough statement must not be used in the last switch case".to_owned(),
        ]
    );
}
